use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use contact_common::{Envelope, FieldError};

use crate::utils::mailer::DispatchError;

pub const RATE_LIMIT_MESSAGE: &str = "너무 많은 요청이 발생했습니다. 1분 후에 다시 시도해주세요.";
pub const DISPATCH_FAILURE_MESSAGE: &str =
    "이메일 전송 중 오류가 발생했습니다. 잠시 후 다시 시도해주세요.";
pub const MALFORMED_BODY_MESSAGE: &str = "요청 형식이 올바르지 않습니다.";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Every failure the contact endpoint can answer with. Each variant maps to
/// the uniform envelope; no underlying error text reaches the caller.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("email dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, envelope) = match &self {
            AppError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Envelope::invalid(errors.clone()))
            }
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                Envelope::failure(RATE_LIMIT_MESSAGE),
            ),
            AppError::MalformedBody(reason) => {
                tracing::debug!("Rejected contact body: {}", reason);
                (
                    StatusCode::BAD_REQUEST,
                    Envelope::failure(MALFORMED_BODY_MESSAGE),
                )
            }
            AppError::Dispatch(_) => {
                tracing::error!("Email send error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Envelope::failure(DISPATCH_FAILURE_MESSAGE),
                )
            }
        };

        (status, Json(envelope)).into_response()
    }
}
