//! Declarative per-field validation.
//!
//! A [`FieldRule`] holds at most one constraint of each kind, each carrying
//! its own message. When several would fail, exactly one is reported, in
//! the order required > min length > max length > pattern.

use regex::Regex;

use crate::field::{Field, FieldSource};
use crate::models::FieldError;

#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("min length {min} exceeds max length {max}")]
    InvertedBounds { min: usize, max: usize },

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Required,
    MinLength,
    MaxLength,
    Pattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation<'a> {
    pub constraint: Constraint,
    pub message: &'a str,
}

#[derive(Debug, Clone)]
pub struct FieldRule {
    required: Option<String>,
    min_length: Option<(usize, String)>,
    max_length: Option<(usize, String)>,
    pattern: Option<(Regex, String)>,
}

impl FieldRule {
    pub fn builder() -> FieldRuleBuilder {
        FieldRuleBuilder::default()
    }

    pub fn is_required(&self) -> bool {
        self.required.is_some()
    }

    /// Checks the trimmed `value`. Blank optional fields always pass.
    pub fn check(&self, value: &str) -> Result<(), Violation<'_>> {
        let value = value.trim();

        if value.is_empty() {
            return match &self.required {
                Some(message) => Err(Violation {
                    constraint: Constraint::Required,
                    message,
                }),
                None => Ok(()),
            };
        }

        let length = value.chars().count();
        if let Some((min, message)) = &self.min_length {
            if length < *min {
                return Err(Violation {
                    constraint: Constraint::MinLength,
                    message,
                });
            }
        }
        if let Some((max, message)) = &self.max_length {
            if length > *max {
                return Err(Violation {
                    constraint: Constraint::MaxLength,
                    message,
                });
            }
        }
        if let Some((pattern, message)) = &self.pattern {
            if !pattern.is_match(value) {
                return Err(Violation {
                    constraint: Constraint::Pattern,
                    message,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FieldRuleBuilder {
    required: Option<String>,
    min_length: Option<(usize, String)>,
    max_length: Option<(usize, String)>,
    pattern: Option<(String, String)>,
}

impl FieldRuleBuilder {
    pub fn required(mut self, message: impl Into<String>) -> Self {
        self.required = Some(message.into());
        self
    }

    pub fn min_length(mut self, min: usize, message: impl Into<String>) -> Self {
        self.min_length = Some((min, message.into()));
        self
    }

    pub fn max_length(mut self, max: usize, message: impl Into<String>) -> Self {
        self.max_length = Some((max, message.into()));
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.pattern = Some((pattern.into(), message.into()));
        self
    }

    pub fn build(self) -> Result<FieldRule, RuleError> {
        if let (Some((min, _)), Some((max, _))) = (&self.min_length, &self.max_length) {
            if min > max {
                return Err(RuleError::InvertedBounds {
                    min: *min,
                    max: *max,
                });
            }
        }
        let pattern = match self.pattern {
            Some((source, message)) => Some((Regex::new(&source)?, message)),
            None => None,
        };
        Ok(FieldRule {
            required: self.required,
            min_length: self.min_length,
            max_length: self.max_length,
            pattern,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub message: Option<String>,
}

impl ValidationResult {
    fn from_check(check: Result<(), Violation<'_>>) -> Self {
        match check {
            Ok(()) => Self {
                valid: true,
                message: None,
            },
            Err(violation) => Self {
                valid: false,
                message: Some(violation.message.to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValidationReport {
    pub results: Vec<(Field, ValidationResult)>,
    pub is_valid: bool,
}

impl FormValidationReport {
    pub fn result(&self, field: Field) -> Option<&ValidationResult> {
        self.results
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, result)| result)
    }

    /// One entry per failing field, in rule-set order.
    pub fn errors(&self) -> Vec<FieldError> {
        self.results
            .iter()
            .filter_map(|(field, result)| {
                result
                    .message
                    .as_ref()
                    .map(|message| FieldError::new(*field, message.clone()))
            })
            .collect()
    }
}

/// Dot-atom local part and a domain of non-empty labels that neither start
/// nor end with `-`.
pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9_%+-]+(?:\.[a-zA-Z0-9_%+-]+)*@(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,63}$";

#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<(Field, FieldRule)>,
}

impl RuleSet {
    pub fn new(rules: Vec<(Field, FieldRule)>) -> Self {
        Self { rules }
    }

    /// Rules for the landing-page contact form.
    pub fn contact() -> Result<Self, RuleError> {
        Ok(Self::new(vec![
            (
                Field::Name,
                FieldRule::builder()
                    .required("이름을 입력해주세요.")
                    .min_length(2, "이름은 2자 이상이어야 합니다.")
                    .pattern(r"^[가-힣a-zA-Z\s]+$", "이름은 한글 또는 영문만 입력 가능합니다.")
                    .build()?,
            ),
            (
                Field::Email,
                FieldRule::builder()
                    .required("이메일을 입력해주세요.")
                    .pattern(
                        EMAIL_PATTERN,
                        "올바른 이메일 형식이 아닙니다.",
                    )
                    .build()?,
            ),
            (
                Field::Phone,
                FieldRule::builder()
                    .pattern(
                        r"^(\d{3}-\d{4}-\d{4}|\d{11}|01\d-\d{3,4}-\d{4})$",
                        "올바른 전화번호 형식이 아닙니다. (예: 010-1234-5678)",
                    )
                    .build()?,
            ),
            (
                Field::Company,
                FieldRule::builder()
                    .max_length(100, "회사명은 100자 이하로 입력해주세요.")
                    .build()?,
            ),
            (
                Field::Message,
                FieldRule::builder()
                    .required("메시지를 입력해주세요.")
                    .min_length(10, "메시지는 10자 이상 입력해주세요.")
                    .max_length(500, "메시지는 500자 이하로 입력해주세요.")
                    .build()?,
            ),
        ]))
    }

    pub fn rule(&self, field: Field) -> Option<&FieldRule> {
        self.rules
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, rule)| rule)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.rules.iter().map(|(field, _)| *field)
    }

    /// Checks one field. Fields without a rule pass.
    pub fn check(&self, field: Field, value: &str) -> ValidationResult {
        match self.rule(field) {
            Some(rule) => ValidationResult::from_check(rule.check(value)),
            None => ValidationResult::from_check(Ok(())),
        }
    }

    pub fn validate<S: FieldSource + ?Sized>(&self, source: &S) -> FormValidationReport {
        let results: Vec<_> = self
            .rules
            .iter()
            .map(|(field, rule)| {
                (
                    *field,
                    ValidationResult::from_check(rule.check(source.value(*field))),
                )
            })
            .collect();
        let is_valid = results.iter().all(|(_, result)| result.valid);
        FormValidationReport { results, is_valid }
    }
}
