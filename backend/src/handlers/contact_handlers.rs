use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use contact_common::{Envelope, Field, FieldError};
use lettre::message::Mailbox;
use tracing::{debug, info};

use crate::{
    error::AppError,
    handlers::contact_payload::ContactBody,
    models::contact_models::ContactSubmission,
    utils::{email_template::subject_for, mailer::OutboundMail},
    AppState,
};

pub const SUCCESS_MESSAGE: &str =
    "문의사항이 성공적으로 전송되었습니다. 빠른 시일 내에 답변드리겠습니다.";
pub const INVALID_EMAIL_MESSAGE: &str = "올바른 이메일 형식이 아닙니다.";

/// `POST /api/contact`. The rate gate has already run as a route layer.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    ContactBody(payload): ContactBody,
) -> Result<Json<Envelope>, AppError> {
    let report = state.rules.validate(&payload);
    if !report.is_valid {
        let errors = report.errors();
        debug!(
            fields = ?errors.iter().map(|e| e.field.as_str()).collect::<Vec<_>>(),
            "Contact submission failed validation"
        );
        return Err(AppError::Validation(errors));
    }

    let submission = ContactSubmission::sanitize(payload);
    let reply_to = reply_to_mailbox(&submission)?;
    let mail = compose_mail(&state, &submission, reply_to, Utc::now());
    state.mailer.send(mail).await?;

    info!("Contact email relayed");
    Ok(Json(Envelope::ok(SUCCESS_MESSAGE)))
}

/// The submitter's address must also be one the mail transport accepts,
/// otherwise it is reported like any other invalid field.
fn reply_to_mailbox(submission: &ContactSubmission) -> Result<Mailbox, AppError> {
    submission.email.parse().map_err(|e: lettre::address::AddressError| {
        debug!("Reply-to address rejected by mail transport: {}", e);
        AppError::Validation(vec![FieldError::new(Field::Email, INVALID_EMAIL_MESSAGE)])
    })
}

fn compose_mail(
    state: &AppState,
    submission: &ContactSubmission,
    reply_to: Mailbox,
    sent_at: DateTime<Utc>,
) -> OutboundMail {
    OutboundMail {
        from: state.config.mail_from.clone(),
        to: state.config.mail_to.clone(),
        reply_to,
        subject: subject_for(submission),
        html: state.template.render(submission, sent_at),
    }
}
