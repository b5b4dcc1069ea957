use std::path::Path;

use chrono::{DateTime, Datelike, Timelike, Utc};
use chrono_tz::Asia::Seoul;
use contact_common::NOT_PROVIDED;

use crate::models::contact_models::ContactSubmission;

const DEFAULT_TEMPLATE: &str = include_str!("../../templates/email.html");

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("failed to read email template {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// HTML body with `{{name}}`-style placeholders.
#[derive(Debug, Clone)]
pub struct EmailTemplate {
    source: String,
}

impl EmailTemplate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Reads the template at `path`, or falls back to the bundled one.
    pub fn load(path: Option<&Path>) -> Result<Self, TemplateError> {
        match path {
            Some(path) => std::fs::read_to_string(path)
                .map(Self::new)
                .map_err(|source| TemplateError::Read {
                    path: path.display().to_string(),
                    source,
                }),
            None => Ok(Self::new(DEFAULT_TEMPLATE)),
        }
    }

    /// Substitutes every placeholder in one pass over the template, so text
    /// inside a value is never treated as a placeholder. Unknown `{{..}}`
    /// tokens are left as they are. Values must already be escaped.
    pub fn render(&self, submission: &ContactSubmission, sent_at: DateTime<Utc>) -> String {
        let timestamp = korean_timestamp(sent_at);
        let mut out = String::with_capacity(self.source.len() + submission.message.len());
        let mut rest = self.source.as_str();

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let substitution = after.find("}}").and_then(|end| {
                placeholder_value(&after[..end], submission, &timestamp).map(|value| (end, value))
            });
            match substitution {
                Some((end, value)) => {
                    out.push_str(value);
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str("{{");
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

fn placeholder_value<'a>(
    key: &str,
    submission: &'a ContactSubmission,
    timestamp: &'a str,
) -> Option<&'a str> {
    match key {
        "name" => Some(submission.name.as_str()),
        "email" => Some(submission.email.as_str()),
        "phone" => Some(submission.phone.as_deref().unwrap_or(NOT_PROVIDED)),
        "company" => Some(submission.company.as_deref().unwrap_or(NOT_PROVIDED)),
        "message" => Some(submission.message.as_str()),
        "timestamp" => Some(timestamp),
        _ => None,
    }
}

/// Formats like a `ko-KR` locale string in Seoul time:
/// `2025. 3. 7. 오후 2:05:09`.
pub fn korean_timestamp(at: DateTime<Utc>) -> String {
    let local = at.with_timezone(&Seoul);
    let (is_pm, hour) = local.hour12();
    format!(
        "{}. {}. {}. {} {}:{:02}:{:02}",
        local.year(),
        local.month(),
        local.day(),
        if is_pm { "오후" } else { "오전" },
        hour,
        local.minute(),
        local.second(),
    )
}

pub fn subject_for(submission: &ContactSubmission) -> String {
    format!(
        "[문의사항] {}님으로부터 새로운 문의가 도착했습니다",
        submission.name
    )
}
