use contact_common::{escape_html, ContactPayload};

/// A submission that passed validation, with every value trimmed and
/// escaped for embedding in HTML. Lives only for the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub message: String,
}

impl ContactSubmission {
    /// Call only after the payload passed the rule set.
    pub fn sanitize(payload: ContactPayload) -> Self {
        let clean = |value: &str| escape_html(value.trim());
        let optional = |value: Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(escape_html)
        };
        Self {
            name: clean(&payload.name),
            email: escape_html(&normalize_email(&payload.email)),
            phone: optional(payload.phone),
            company: optional(payload.company),
            message: clean(payload.message.as_deref().unwrap_or_default()),
        }
    }
}

/// Trims and lowercases the address.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}
