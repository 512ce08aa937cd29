//! Concrete [`ChatTransport`] over reqwest.
//!
//! One POST per exchange, one GET per probe. No retries and no client-side
//! timeout here: deadlines and cancellation belong to the session client.
//!
//! The bearer credential is only exposed while building the request header.

use secrecy::{ExposeSecret, SecretString};

use davood_core::backend::transport::ChatTransport;
use davood_types::error::SessionError;

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("davood/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client (shared connection pool, custom TLS).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl ChatTransport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        bearer: Option<&SecretString>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, SessionError> {
        let mut request = self
            .client
            .post(url)
            .header("content-type", "application/json")
            .json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| SessionError::Network(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "Backend returned error status");
            return Err(SessionError::Transport {
                status: status.as_u16(),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| SessionError::Network(format!("failed to parse response: {e}")))
    }

    async fn probe(&self, url: &str) -> Result<u16, SessionError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SessionError::Network(e.to_string()))?;
        Ok(response.status().as_u16())
    }
}
