use async_trait::async_trait;
use contact_common::{ContactPayload, Envelope};

/// What came back from the server, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerReply {
    pub status: u16,
    /// `None` when the body was not a JSON envelope.
    pub envelope: Option<Envelope>,
}

impl ServerReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
            && self.envelope.as_ref().is_some_and(|envelope| envelope.success)
    }
}

/// No response was obtained at all.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("failed to encode request: {0}")]
    Encode(String),
    #[error("request failed: {0}")]
    Request(String),
}

#[async_trait(?Send)]
pub trait ContactTransport {
    async fn submit(&self, payload: &ContactPayload) -> Result<ServerReply, NetworkError>;
}

#[async_trait(?Send)]
impl<T: ContactTransport + ?Sized> ContactTransport for std::rc::Rc<T> {
    async fn submit(&self, payload: &ContactPayload) -> Result<ServerReply, NetworkError> {
        (**self).submit(payload).await
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::HttpTransport;

#[cfg(target_arch = "wasm32")]
mod browser {
    use async_trait::async_trait;
    use contact_common::{ContactPayload, Envelope};
    use gloo_net::http::Request;

    use super::{ContactTransport, NetworkError, ServerReply};
    use crate::config;

    /// `POST {BACKEND_URL}/api/contact` with a JSON body.
    #[derive(Debug, Clone)]
    pub struct HttpTransport {
        endpoint: String,
    }

    impl HttpTransport {
        pub fn new(endpoint: impl Into<String>) -> Self {
            Self {
                endpoint: endpoint.into(),
            }
        }
    }

    impl Default for HttpTransport {
        fn default() -> Self {
            Self::new(config::contact_endpoint())
        }
    }

    #[async_trait(?Send)]
    impl ContactTransport for HttpTransport {
        async fn submit(&self, payload: &ContactPayload) -> Result<ServerReply, NetworkError> {
            let response = Request::post(&self.endpoint)
                .json(payload)
                .map_err(|e| NetworkError::Encode(e.to_string()))?
                .send()
                .await
                .map_err(|e| NetworkError::Request(e.to_string()))?;

            let status = response.status();
            let envelope = match response.json::<Envelope>().await {
                Ok(envelope) => Some(envelope),
                Err(e) => {
                    log::warn!("Contact response was not an envelope (status {}): {}", status, e);
                    None
                }
            };
            Ok(ServerReply { status, envelope })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_needs_both_status_and_flag() {
        let ok = ServerReply {
            status: 200,
            envelope: Some(Envelope::ok("done")),
        };
        let flagged_failure = ServerReply {
            status: 200,
            envelope: Some(Envelope::failure("nope")),
        };
        let bare_200 = ServerReply {
            status: 200,
            envelope: None,
        };
        let server_error = ServerReply {
            status: 500,
            envelope: Some(Envelope {
                success: true,
                message: None,
                errors: None,
            }),
        };

        assert!(ok.is_success());
        assert!(!flagged_failure.is_success());
        assert!(!bare_200.is_success());
        assert!(!server_error.is_success());
    }
}
