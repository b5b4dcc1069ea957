use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("failed to build email message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("smtp transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// A fully composed HTML email ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMail {
    pub from: Mailbox,
    pub to: Mailbox,
    pub reply_to: Mailbox,
    pub subject: String,
    pub html: String,
}

impl OutboundMail {
    pub fn into_message(self) -> Result<Message, DispatchError> {
        let message = Message::builder()
            .from(self.from)
            .to(self.to)
            .reply_to(self.reply_to)
            .subject(self.subject)
            .header(ContentType::TEXT_HTML)
            .body(self.html)?;
        Ok(message)
    }
}

/// Hands composed mail to whatever actually delivers it. Failures are
/// returned as-is; nothing here retries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutboundMail) -> Result<(), DispatchError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, DispatchError> {
        let tls = TlsParameters::builder(config.host.clone())
            .dangerous_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .tls(Tls::Opportunistic(tls))
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(config.timeout))
            .build();
        Ok(Self { transport })
    }

    /// Opens a connection and says hello. Only used to log readiness at
    /// startup; a failure here does not stop the server.
    pub async fn verify(&self) -> Result<bool, DispatchError> {
        Ok(self.transport.test_connection().await?)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutboundMail) -> Result<(), DispatchError> {
        let message = mail.into_message()?;
        tracing::info!("Attempting to send contact email via SMTP");
        let response = self.transport.send(message).await?;
        tracing::debug!("SMTP accepted message with code {}", response.code());
        Ok(())
    }
}
