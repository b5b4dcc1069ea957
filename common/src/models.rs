use serde::{Deserialize, Serialize};

use crate::field::{Field, FieldSource, FormValues};

/// Substituted for optional fields the submitter left out.
pub const NOT_PROVIDED: &str = "미입력";

/// Body of `POST /api/contact`.
///
/// Optional fields the user left blank are sent as absent, never as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPayload {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ContactPayload {
    /// Builds a payload from trimmed form values. Blank inputs become absent.
    pub fn from_values(values: &FormValues) -> Self {
        let present = |field: Field| {
            let trimmed = values.get(field).trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        Self {
            name: values.name.trim().to_string(),
            email: values.email.trim().to_string(),
            phone: present(Field::Phone),
            company: present(Field::Company),
            message: present(Field::Message),
        }
    }

    /// Applies `f` to every present value.
    pub fn map_values(self, f: impl Fn(&str) -> String) -> Self {
        Self {
            name: f(&self.name),
            email: f(&self.email),
            phone: self.phone.as_deref().map(&f),
            company: self.company.as_deref().map(&f),
            message: self.message.as_deref().map(&f),
        }
    }
}

impl FieldSource for ContactPayload {
    fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Phone => self.phone.as_deref().unwrap_or_default(),
            Field::Company => self.company.as_deref().unwrap_or_default(),
            Field::Message => self.message.as_deref().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str().to_string(),
            message: message.into(),
        }
    }
}

/// The uniform `{ success, message | errors }` response shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl Envelope {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            errors: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            errors: None,
        }
    }

    pub fn invalid(errors: Vec<FieldError>) -> Self {
        Self {
            success: false,
            message: None,
            errors: Some(errors),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub message: String,
}
