//! ChatTransport trait definition.
//!
//! The session client talks to the backend only through this trait, so the
//! reqwest adapter in davood-infra can be swapped for a scripted one in tests.

use davood_types::error::SessionError;
use secrecy::SecretString;

/// Transport for the conversational backend.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ChatTransport: Send + Sync {
    /// POST `body` as JSON to `url`, with `Authorization: Bearer` when a
    /// credential is given, and return the parsed JSON response.
    ///
    /// Non-2xx statuses map to [`SessionError::Transport`]; anything that
    /// prevents a parsed response maps to [`SessionError::Network`].
    fn post_json(
        &self,
        url: &str,
        bearer: Option<&SecretString>,
        body: &serde_json::Value,
    ) -> impl std::future::Future<Output = Result<serde_json::Value, SessionError>> + Send;

    /// GET `url` and report the HTTP status code.
    fn probe(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = Result<u16, SessionError>> + Send;
}
