//! In-process doubles for the chat ports.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use davood_types::chat::Message;
use davood_types::error::{ChatError, SessionError, StorageError};
use davood_types::notice::Toast;
use secrecy::{ExposeSecret, SecretString};

use crate::backend::transport::ChatTransport;
use crate::chat::view::ChatView;
use crate::speech::SpeechOutput;
use crate::storage::kv_store::KvStore;

// ---------------------------------------------------------------------------
// Key-value store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MapStore {
    pub values: Mutex<BTreeMap<String, serde_json::Value>>,
    pub fail_writes: AtomicBool,
}

impl MapStore {
    pub fn snapshot(&self) -> BTreeMap<String, serde_json::Value> {
        self.values.lock().unwrap().clone()
    }
}

impl KvStore for MapStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io("read-only store".to_string()));
        }
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.values.lock().unwrap().clear();
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.values.lock().unwrap().keys().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub bearer: Option<String>,
    pub body: serde_json::Value,
}

#[derive(Clone)]
pub enum Behavior {
    Reply(serde_json::Value),
    Fail(SessionError),
    Hang,
}

#[derive(Clone)]
pub struct ScriptedTransport {
    behavior: Behavior,
    delay: Option<Duration>,
    probe: Result<u16, SessionError>,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
    pub probes: Arc<AtomicUsize>,
}

impl ScriptedTransport {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            delay: None,
            probe: Ok(200),
            requests: Arc::new(Mutex::new(Vec::new())),
            probes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn replying(body: serde_json::Value) -> Self {
        Self::new(Behavior::Reply(body))
    }

    pub fn failing(error: SessionError) -> Self {
        Self::new(Behavior::Fail(error))
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_probe(mut self, probe: Result<u16, SessionError>) -> Self {
        self.probe = probe;
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_body(&self) -> serde_json::Value {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|r| r.body.clone())
            .expect("no request recorded")
    }
}

impl ChatTransport for ScriptedTransport {
    async fn post_json(
        &self,
        url: &str,
        bearer: Option<&SecretString>,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, SessionError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            bearer: bearer.map(|b| b.expose_secret().to_string()),
            body: body.clone(),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.behavior {
            Behavior::Reply(value) => Ok(value.clone()),
            Behavior::Fail(err) => Err(err.clone()),
            Behavior::Hang => std::future::pending().await,
        }
    }

    async fn probe(&self, _url: &str) -> Result<u16, SessionError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.probe.clone()
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingView {
    pub rendered: Mutex<Vec<(Message, bool)>>,
    pub typing: Mutex<Vec<bool>>,
    pub toasts: Mutex<Vec<Toast>>,
    pub fail_assistant_renders: AtomicBool,
}

impl RecordingView {
    pub fn contents(&self) -> Vec<String> {
        self.rendered
            .lock()
            .unwrap()
            .iter()
            .map(|(m, _)| m.content.clone())
            .collect()
    }

    pub fn toast_messages(&self) -> Vec<String> {
        self.toasts
            .lock()
            .unwrap()
            .iter()
            .map(|t| t.message.clone())
            .collect()
    }
}

impl ChatView for RecordingView {
    fn render_message(&self, message: &Message, formatted: bool) -> Result<(), ChatError> {
        if self.fail_assistant_renders.load(Ordering::SeqCst)
            && message.role == davood_types::chat::MessageRole::Assistant
            && !message.content.starts_with("Sorry")
        {
            return Err(ChatError::Render("terminal closed".to_string()));
        }
        self.rendered
            .lock()
            .unwrap()
            .push((message.clone(), formatted));
        Ok(())
    }

    fn set_typing(&self, visible: bool) {
        self.typing.lock().unwrap().push(visible);
    }

    fn evict_oldest(&self) {
        let mut rendered = self.rendered.lock().unwrap();
        if !rendered.is_empty() {
            rendered.remove(0);
        }
    }

    fn rendered_count(&self) -> usize {
        self.rendered.lock().unwrap().len()
    }

    fn clear(&self) {
        self.rendered.lock().unwrap().clear();
    }

    fn toast(&self, toast: &Toast) {
        self.toasts.lock().unwrap().push(toast.clone());
    }
}

// ---------------------------------------------------------------------------
// Speech
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingSpeech {
    pub spoken: Mutex<Vec<(String, f32)>>,
    pub engines: Mutex<Vec<String>>,
}

impl SpeechOutput for RecordingSpeech {
    fn speak(&self, text: &str, speed: f32) {
        self.spoken.lock().unwrap().push((text.to_string(), speed));
    }

    fn stop(&self) {}

    fn set_engine(&self, engine: &str) {
        self.engines.lock().unwrap().push(engine.to_string());
    }
}
