//! Field model shared by the contact endpoint and the browser form.
//!
//! Both sides validate against the same [`RuleSet::contact`] table; the
//! server re-runs it on every request and never trusts the client's verdict.

pub mod field;
pub mod models;
pub mod rules;
pub mod sanitize;

pub use field::{Field, FieldSource, FormValues, DRAFT_KEY};
pub use models::{ContactPayload, Envelope, FieldError, Health, NOT_PROVIDED};
pub use rules::{
    Constraint, FieldRule, FieldRuleBuilder, FormValidationReport, RuleError, RuleSet,
    ValidationResult, Violation,
};
pub use sanitize::{escape_html, escape_text};
