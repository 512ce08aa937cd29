//! Session client: endpoint configuration and the backend exchange.
//!
//! `SessionClient` owns the endpoint and credential, builds the outbound
//! payload from the shared conversation log, and turns every failure into a
//! fallback reply so callers always receive something renderable.

use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use secrecy::{ExposeSecret, SecretString};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use davood_types::chat::Message;
use davood_types::error::{SessionError, StorageError};
use davood_types::exchange::{ChatRequest, ConnectionStatus, SendOutcome};

use crate::backend::fallback::{fallback_reply, FallbackSelector, RandomFallback};
use crate::backend::transport::ChatTransport;
use crate::chat::log::{lock_log, SharedLog, CONTEXT_WINDOW};
use crate::storage::kv_store::KvStore;
use crate::storage::{API_ENDPOINT_KEY, API_KEY_KEY};

/// Reply text when the backend's JSON carries neither `response` nor
/// `message`.
pub const MISSING_REPLY: &str = "undefined";

/// Where requests go and how they authenticate.
pub struct EndpointConfig {
    pub url: String,
    /// Bearer credential. Never logged.
    pub credential: Option<SecretString>,
}

impl EndpointConfig {
    pub fn new(url: impl Into<String>, credential: Option<SecretString>) -> Self {
        Self {
            url: url.into(),
            credential,
        }
    }
}

/// Communicates with the conversational backend and maintains the rolling
/// context through the shared log.
pub struct SessionClient<T: ChatTransport, S: KvStore> {
    transport: T,
    store: Arc<S>,
    endpoint: RwLock<EndpointConfig>,
    default_url: String,
    log: SharedLog,
    fallback: Box<dyn FallbackSelector>,
    request_timeout: Option<Duration>,
}

impl<T: ChatTransport, S: KvStore> SessionClient<T, S> {
    /// Create a client with an explicit endpoint.
    pub fn new(transport: T, store: Arc<S>, endpoint: EndpointConfig, log: SharedLog) -> Self {
        let default_url = endpoint.url.clone();
        Self {
            transport,
            store,
            endpoint: RwLock::new(endpoint),
            default_url,
            log,
            fallback: Box::new(RandomFallback),
            request_timeout: None,
        }
    }

    /// Create a client from persisted `apiEndpoint` / `apiKey`, falling back
    /// to `default_url` and no credential.
    pub async fn load(
        transport: T,
        store: Arc<S>,
        default_url: &str,
        log: SharedLog,
    ) -> Result<Self, StorageError> {
        let url = match store.get(API_ENDPOINT_KEY).await? {
            Some(serde_json::Value::String(url)) if !url.is_empty() => url,
            _ => default_url.to_string(),
        };
        let credential = match store.get(API_KEY_KEY).await? {
            Some(serde_json::Value::String(key)) => non_empty_secret(key),
            _ => None,
        };
        debug!(endpoint = %url, has_credential = credential.is_some(), "Session client loaded");

        let mut client = Self::new(transport, store, EndpointConfig::new(url, credential), log);
        client.default_url = default_url.to_string();
        Ok(client)
    }

    /// Replace the fallback selector (tests inject a fixed one).
    pub fn with_fallback(mut self, selector: Box<dyn FallbackSelector>) -> Self {
        self.fallback = selector;
        self
    }

    /// Abandon requests that have not answered within `timeout`.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Current endpoint URL.
    pub fn endpoint(&self) -> String {
        self.read_endpoint().url.clone()
    }

    pub fn has_credential(&self) -> bool {
        self.read_endpoint().credential.is_some()
    }

    /// The log this client reads context from and appends exchanges to.
    pub fn log(&self) -> &SharedLog {
        &self.log
    }

    /// Set endpoint and credential, persisting both as given.
    ///
    /// No URL validation is performed. An empty credential means "send no
    /// Authorization header".
    pub async fn configure(&self, endpoint: &str, credential: &str) -> Result<(), StorageError> {
        {
            let mut current = self
                .endpoint
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            current.url = endpoint.to_string();
            current.credential = non_empty_secret(credential.to_string());
        }

        self.store
            .set(API_ENDPOINT_KEY, &serde_json::Value::String(endpoint.to_string()))
            .await?;
        self.store
            .set(API_KEY_KEY, &serde_json::Value::String(credential.to_string()))
            .await?;

        info!(endpoint = %endpoint, has_credential = !credential.is_empty(), "Endpoint configured");
        Ok(())
    }

    /// Revert to the default endpoint and drop the credential, in memory only.
    pub fn reset_endpoint(&self) {
        let mut current = self
            .endpoint
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        current.url = self.default_url.clone();
        current.credential = None;
    }

    /// Send `message` to the backend.
    ///
    /// On success both the user message and the reply are appended to the
    /// log as exchanged. On any failure nothing is appended and the outcome
    /// carries a fallback reply embedding `message`. Cancelling `cancel`, or
    /// exceeding the configured request timeout, counts as a network fault.
    pub async fn send(
        &self,
        message: &str,
        include_context: bool,
        cancel: &CancellationToken,
    ) -> SendOutcome {
        let request = self.build_request(message, include_context);
        let context_len = request.context.as_ref().map_or(0, Vec::len);

        let result = match serde_json::to_value(&request) {
            Ok(body) => {
                let (url, bearer) = self.request_target();
                debug!(endpoint = %url, context_len, "Sending message");
                self.guard(self.transport.post_json(&url, bearer.as_ref(), &body), cancel)
                    .await
            }
            Err(e) => Err(SessionError::Network(format!("failed to encode request: {e}"))),
        };

        match result {
            Ok(data) => {
                let reply = extract_reply(&data);
                lock_log(&self.log)
                    .push_exchange(Message::user(message), Message::assistant(reply.clone()));
                info!(context_len, reply_len = reply.len(), "Backend replied");
                SendOutcome::delivered(reply, data)
            }
            Err(e) => {
                warn!(error = %e, "Backend exchange failed, using fallback reply");
                SendOutcome::fallback(e.to_string(), fallback_reply(self.fallback.as_ref(), message))
            }
        }
    }

    /// Probe the endpoint with a GET. Does not touch the log.
    pub async fn test_connection(&self) -> ConnectionStatus {
        let url = self.endpoint();
        match self.transport.probe(&url).await {
            Ok(status) => {
                info!(endpoint = %url, status, "Connection probe answered");
                ConnectionStatus::from_status(status)
            }
            Err(e) => {
                warn!(endpoint = %url, error = %e, "Connection probe failed");
                ConnectionStatus::unreachable(&e.to_string())
            }
        }
    }

    /// Empty the conversation log.
    pub fn clear_history(&self) {
        lock_log(&self.log).clear();
        debug!("Conversation history cleared");
    }

    /// Messages eligible as request context, oldest first.
    pub fn history(&self) -> Vec<Message> {
        lock_log(&self.log).context_window(usize::MAX)
    }

    fn build_request(&self, message: &str, include_context: bool) -> ChatRequest {
        let context = if include_context {
            let window = lock_log(&self.log).context_window(CONTEXT_WINDOW);
            (!window.is_empty()).then_some(window)
        } else {
            None
        };

        ChatRequest {
            message: message.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            context,
        }
    }

    fn request_target(&self) -> (String, Option<SecretString>) {
        let endpoint = self.read_endpoint();
        let bearer = endpoint
            .credential
            .as_ref()
            .map(|c| SecretString::from(c.expose_secret().to_string()));
        (endpoint.url.clone(), bearer)
    }

    fn read_endpoint(&self) -> std::sync::RwLockReadGuard<'_, EndpointConfig> {
        self.endpoint
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Race `call` against cancellation and the optional deadline.
    async fn guard<F>(&self, call: F, cancel: &CancellationToken) -> Result<serde_json::Value, SessionError>
    where
        F: Future<Output = Result<serde_json::Value, SessionError>>,
    {
        let bounded = async {
            match self.request_timeout {
                Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                    SessionError::Network(format!("request timed out after {}ms", limit.as_millis()))
                })?,
                None => call.await,
            }
        };

        tokio::select! {
            _ = cancel.cancelled() => Err(SessionError::Network("request cancelled".to_string())),
            result = bounded => result,
        }
    }
}

/// Pull the reply text out of a backend response: `response`, else
/// `message`, else [`MISSING_REPLY`]. Empty strings, null, false and zero
/// count as absent.
pub fn extract_reply(data: &serde_json::Value) -> String {
    ["response", "message"]
        .iter()
        .filter_map(|field| data.get(field))
        .find_map(|value| match value {
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null | serde_json::Value::Bool(false) => None,
            serde_json::Value::Number(n) if n.as_f64() == Some(0.0) => None,
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| MISSING_REPLY.to_string())
}

fn non_empty_secret(value: String) -> Option<SecretString> {
    (!value.is_empty()).then(|| SecretString::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fallback::FixedFallback;
    use crate::chat::log::ConversationLog;
    use crate::chat::testing::{Behavior, MapStore, ScriptedTransport};
    use serde_json::json;

    fn client(transport: ScriptedTransport) -> SessionClient<ScriptedTransport, MapStore> {
        SessionClient::new(
            transport,
            Arc::new(MapStore::default()),
            EndpointConfig::new("http://backend.test/api/chat", None),
            ConversationLog::new(100).shared(),
        )
        .with_fallback(Box::new(FixedFallback(0)))
    }

    #[tokio::test]
    async fn test_send_without_context_never_includes_field() {
        let transport = ScriptedTransport::replying(json!({"response": "ok"}));
        let client = client(transport.clone());
        let cancel = CancellationToken::new();

        for text in ["first", "second", "third"] {
            client.send(text, false, &cancel).await;
            let body = transport.last_body();
            assert!(body.get("context").is_none(), "context leaked for {text}");
            assert_eq!(body["message"], text);
        }
    }

    #[tokio::test]
    async fn test_send_with_empty_history_omits_context() {
        let transport = ScriptedTransport::replying(json!({"response": "ok"}));
        let client = client(transport.clone());
        client.send("hello", true, &CancellationToken::new()).await;
        assert!(transport.last_body().get("context").is_none());
    }

    #[tokio::test]
    async fn test_send_with_context_sends_last_ten_in_order() {
        let transport = ScriptedTransport::replying(json!({"response": "r"}));
        let client = client(transport.clone());
        let cancel = CancellationToken::new();

        for n in 0..7 {
            client.send(&format!("m{n}"), true, &cancel).await;
        }
        // 14 exchanged entries exist before this call.
        client.send("latest", true, &cancel).await;

        let context = transport.last_body()["context"].as_array().unwrap().clone();
        assert_eq!(context.len(), 10);
        let contents: Vec<&str> = context
            .iter()
            .map(|m| m["content"].as_str().unwrap())
            .collect();
        assert_eq!(
            contents,
            vec!["m2", "r", "m3", "r", "m4", "r", "m5", "r", "m6", "r"]
        );
        assert_eq!(context[0]["role"], "user");
        assert_eq!(context[1]["role"], "assistant");
    }

    #[tokio::test]
    async fn test_payload_shape_and_bearer_header() {
        let transport = ScriptedTransport::replying(json!({"response": "ok"}));
        let client = client(transport.clone());
        client
            .configure("http://other.test/chat", "tok-123")
            .await
            .unwrap();
        client.send("hi", true, &CancellationToken::new()).await;

        let requests = transport.requests.lock().unwrap().clone();
        let req = requests.last().unwrap();
        assert_eq!(req.url, "http://other.test/chat");
        assert_eq!(req.bearer.as_deref(), Some("tok-123"));
        let ts = req.body["timestamp"].as_str().unwrap();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[tokio::test]
    async fn test_empty_credential_sends_no_bearer() {
        let transport = ScriptedTransport::replying(json!({"response": "ok"}));
        let client = client(transport.clone());
        client.configure("http://x.test", "").await.unwrap();
        client.send("hi", false, &CancellationToken::new()).await;
        assert!(transport.requests.lock().unwrap()[0].bearer.is_none());
        assert!(!client.has_credential());
    }

    #[tokio::test]
    async fn test_success_appends_both_messages() {
        let transport = ScriptedTransport::replying(json!({"response": "hi there"}));
        let client = client(transport);
        let outcome = client.send("hello", true, &CancellationToken::new()).await;

        assert!(outcome.success);
        assert_eq!(outcome.response, "hi there");
        assert!(outcome.data.is_some());
        let history = client.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "hello");
        assert_eq!(history[1].content, "hi there");
    }

    #[tokio::test]
    async fn test_reply_falls_back_to_message_field() {
        let transport = ScriptedTransport::replying(json!({"message": "from message"}));
        let outcome = client(transport)
            .send("q", false, &CancellationToken::new())
            .await;
        assert_eq!(outcome.response, "from message");
    }

    #[tokio::test]
    async fn test_unexpected_shape_renders_undefined() {
        let transport = ScriptedTransport::replying(json!({"answer": 42}));
        let outcome = client(transport)
            .send("q", false, &CancellationToken::new())
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.response, MISSING_REPLY);
    }

    #[tokio::test]
    async fn test_http_500_yields_fallback_with_message() {
        let transport = ScriptedTransport::failing(SessionError::Transport { status: 500 });
        let client = client(transport);
        let outcome = client
            .send("is anyone there", true, &CancellationToken::new())
            .await;

        assert!(!outcome.success);
        assert!(!outcome.response.is_empty());
        assert!(outcome.response.contains("is anyone there"));
        assert_eq!(outcome.error.as_deref(), Some("HTTP error! status: 500"));
        assert!(client.history().is_empty());
    }

    #[tokio::test]
    async fn test_network_fault_yields_fallback() {
        let transport =
            ScriptedTransport::failing(SessionError::Network("dns failure".to_string()));
        let outcome = client(transport)
            .send("hello", false, &CancellationToken::new())
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("dns failure"));
        assert!(outcome.response.contains("hello"));
    }

    #[tokio::test]
    async fn test_cancellation_resolves_to_fallback() {
        let transport = ScriptedTransport::new(Behavior::Hang);
        let client = client(transport);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let outcome = client.send("stuck", true, &cancel).await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("request cancelled"));
        assert!(outcome.response.contains("stuck"));
    }

    #[tokio::test]
    async fn test_request_timeout_resolves_to_fallback() {
        let transport = ScriptedTransport::new(Behavior::Hang);
        let client = client(transport).with_request_timeout(Some(Duration::from_millis(30)));
        let outcome = client.send("slow", false, &CancellationToken::new()).await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_clear_history_then_read_is_empty() {
        let transport = ScriptedTransport::replying(json!({"response": "ok"}));
        let client = client(transport);
        client.send("a", true, &CancellationToken::new()).await;
        assert!(!client.history().is_empty());
        client.clear_history();
        assert!(client.history().is_empty());
    }

    #[tokio::test]
    async fn test_configure_twice_is_idempotent() {
        let store = Arc::new(MapStore::default());
        let client = SessionClient::new(
            ScriptedTransport::replying(json!({})),
            store.clone(),
            EndpointConfig::new("http://a.test", None),
            ConversationLog::default().shared(),
        );

        client.configure("http://b.test/chat", "secret").await.unwrap();
        let first = store.snapshot();
        client.configure("http://b.test/chat", "secret").await.unwrap();
        assert_eq!(first, store.snapshot());
        assert_eq!(first[API_ENDPOINT_KEY], json!("http://b.test/chat"));
        assert_eq!(first[API_KEY_KEY], json!("secret"));
    }

    #[tokio::test]
    async fn test_load_reads_persisted_endpoint() {
        let store = Arc::new(MapStore::default());
        store
            .set(API_ENDPOINT_KEY, &json!("http://saved.test/chat"))
            .await
            .unwrap();
        store.set(API_KEY_KEY, &json!("k")).await.unwrap();

        let client = SessionClient::load(
            ScriptedTransport::replying(json!({})),
            store,
            "http://default.test",
            ConversationLog::default().shared(),
        )
        .await
        .unwrap();
        assert_eq!(client.endpoint(), "http://saved.test/chat");
        assert!(client.has_credential());

        client.reset_endpoint();
        assert_eq!(client.endpoint(), "http://default.test");
        assert!(!client.has_credential());
    }

    #[tokio::test]
    async fn test_connection_probe_does_not_touch_history() {
        let transport = ScriptedTransport::replying(json!({"response": "ok"}))
            .with_probe(Ok(503));
        let client = client(transport.clone());
        client.send("a", true, &CancellationToken::new()).await;

        let status = client.test_connection().await;
        assert!(!status.success);
        assert_eq!(status.status, Some(503));
        assert_eq!(client.history().len(), 2);
        assert_eq!(transport.probes.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_connection_probe_unreachable() {
        let transport = ScriptedTransport::replying(json!({}))
            .with_probe(Err(SessionError::Network("refused".to_string())));
        let status = client(transport).test_connection().await;
        assert_eq!(status.message, "Connection failed: refused");
    }

    #[test]
    fn test_extract_reply_prefers_response() {
        assert_eq!(extract_reply(&json!({"response": "a", "message": "b"})), "a");
        assert_eq!(extract_reply(&json!({"response": "", "message": "b"})), "b");
        assert_eq!(extract_reply(&json!({"response": null})), MISSING_REPLY);
        assert_eq!(extract_reply(&json!({"response": 0, "message": "m"})), "m");
        assert_eq!(extract_reply(&json!({"response": 0.0})), MISSING_REPLY);
        assert_eq!(extract_reply(&json!({"response": 7})), "7");
        assert_eq!(extract_reply(&json!("bare string")), MISSING_REPLY);
    }
}
