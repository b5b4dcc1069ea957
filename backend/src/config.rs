use std::num::NonZeroU32;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use lettre::message::Mailbox;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub enum CorsOrigin {
    Any,
    List(Vec<HeaderValue>),
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub accept_invalid_certs: bool,
    /// Applied to connect, greeting and every socket operation.
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub cors_origin: CorsOrigin,
    /// Take the client address from the last `X-Forwarded-For` hop.
    pub trust_proxy: bool,
    pub smtp: SmtpConfig,
    pub mail_from: Mailbox,
    pub mail_to: Mailbox,
    pub template_path: Option<PathBuf>,
    pub rate_limit_per_minute: NonZeroU32,
    pub sentry_dsn: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &'static str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &'static str| var(key).ok_or(ConfigError::Missing(key));

        let rate_limit: u32 = parse_or(&var, "RATE_LIMIT_PER_MINUTE", 10)?;
        let rate_limit_per_minute = NonZeroU32::new(rate_limit).ok_or(ConfigError::Invalid {
            key: "RATE_LIMIT_PER_MINUTE",
            reason: "must be greater than zero".to_string(),
        })?;

        Ok(Self {
            port: parse_or(&var, "PORT", 3000)?,
            cors_origin: parse_cors(var("CORS_ORIGIN"))?,
            trust_proxy: parse_or(&var, "TRUST_PROXY", true)?,
            smtp: SmtpConfig {
                host: required("EMAIL_HOST")?,
                port: parse_or(&var, "EMAIL_PORT", 587)?,
                username: required("EMAIL_USER")?,
                password: required("EMAIL_PASS")?,
                accept_invalid_certs: parse_or(&var, "EMAIL_TLS_ACCEPT_INVALID_CERTS", false)?,
                timeout: Duration::from_secs(parse_or(&var, "EMAIL_TIMEOUT_SECS", 10)?),
            },
            mail_from: parse_mailbox("EMAIL_FROM", required("EMAIL_FROM")?)?,
            mail_to: parse_mailbox("EMAIL_TO", required("EMAIL_TO")?)?,
            template_path: var("EMAIL_TEMPLATE_PATH").map(PathBuf::from),
            rate_limit_per_minute,
            sentry_dsn: var("SENTRY_DSN"),
        })
    }
}

fn parse_or<T>(
    var: impl Fn(&'static str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_mailbox(key: &'static str, raw: String) -> Result<Mailbox, ConfigError> {
    raw.parse().map_err(|e: lettre::address::AddressError| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

fn parse_cors(raw: Option<String>) -> Result<CorsOrigin, ConfigError> {
    let raw = match raw {
        Some(raw) if raw.trim() != "*" => raw,
        _ => return Ok(CorsOrigin::Any),
    };
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
                key: "CORS_ORIGIN",
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(CorsOrigin::List)
}
