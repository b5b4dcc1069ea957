use axum::{
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use contact_common::ContactPayload;

use crate::error::AppError;

/// Accepts the contact payload as JSON or as a urlencoded form post.
/// Unreadable bodies become a 400 envelope instead of axum's plain-text
/// rejection.
pub struct ContactBody(pub ContactPayload);

impl<S> FromRequest<S> for ContactBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            let Form(payload) = Form::<ContactPayload>::from_request(req, state)
                .await
                .map_err(|rejection| AppError::MalformedBody(rejection.body_text()))?;
            Ok(Self(payload))
        } else {
            let Json(payload) = Json::<ContactPayload>::from_request(req, state)
                .await
                .map_err(|rejection| AppError::MalformedBody(rejection.body_text()))?;
            Ok(Self(payload))
        }
    }
}
