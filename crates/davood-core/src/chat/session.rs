//! The presentation loop.
//!
//! `ChatSession` owns the display flow: it validates input, renders the user
//! message, drives `SessionClient::send`, waits out the artificial typing
//! delay, renders the reply, hands it to speech, and keeps the rendered
//! view, the conversation log, and the persisted transcript in step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use davood_types::chat::{ChatExport, LogEntry, Message};
use davood_types::config::Settings;
use davood_types::error::{ChatError, StorageError};
use davood_types::exchange::{ConnectionStatus, SendOutcome};
use davood_types::notice::Toast;

use crate::backend::transport::ChatTransport;
use crate::chat::client::SessionClient;
use crate::chat::log::lock_log;
use crate::chat::view::ChatView;
use crate::speech::SpeechOutput;
use crate::storage::kv_store::KvStore;
use crate::storage::{CHAT_HISTORY_KEY, SETTINGS_KEY};

/// Greeting rendered every time the session starts.
pub const WELCOME_MESSAGE: &str = "Hello! I'm DavoodAI, your intelligent assistant. I can help you with various tasks using natural language processing and voice interaction. How can I assist you today?";

/// Rendered in place of a reply when the presentation path itself fails.
pub const GENERIC_ERROR_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

/// Why a submission was not processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Input was empty after trimming.
    Empty,
    /// Another exchange is still in progress.
    Busy,
}

/// Result of [`ChatSession::submit`].
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    Rejected(RejectReason),
    /// The exchange completed; the reply may be a fallback.
    Replied(SendOutcome),
    /// Rendering or persistence failed; the generic error message was shown.
    Failed(String),
}

/// Clears the in-progress flag when an exchange ends, however it ends.
struct ExchangeGuard<'a>(&'a AtomicBool);

impl Drop for ExchangeGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ChatSession<T, S, V, P>
where
    T: ChatTransport,
    S: KvStore,
    V: ChatView,
    P: SpeechOutput,
{
    client: SessionClient<T, S>,
    store: Arc<S>,
    view: V,
    speech: P,
    settings: RwLock<Settings>,
    in_progress: AtomicBool,
}

impl<T, S, V, P> ChatSession<T, S, V, P>
where
    T: ChatTransport,
    S: KvStore,
    V: ChatView,
    P: SpeechOutput,
{
    pub fn new(client: SessionClient<T, S>, store: Arc<S>, view: V, speech: P, settings: Settings) -> Self {
        lock_log(client.log()).set_retention(settings.effective_message_limit());
        speech.set_engine(&settings.tts_engine);
        Self {
            client,
            store,
            view,
            speech,
            settings: RwLock::new(settings),
            in_progress: AtomicBool::new(false),
        }
    }

    pub fn client(&self) -> &SessionClient<T, S> {
        &self.client
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> Settings {
        self.settings
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Whether an exchange is currently running.
    pub fn is_busy(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Load the persisted transcript into the log without rendering it.
    /// Returns the number of entries kept.
    pub async fn restore(&self) -> Result<usize, ChatError> {
        let restored = self.load_transcript().await?;
        let mut log = lock_log(self.client.log());
        log.replace(restored);
        Ok(log.len())
    }

    /// Restore the persisted transcript, render it as plain text, then greet.
    pub async fn start(&self) -> Result<(), ChatError> {
        let restored = self.restore().await?;
        let limit = self.settings().effective_message_limit();
        info!(restored, "Restored chat transcript");

        for entry in self.transcript() {
            self.view.render_message(&entry.message, false)?;
            self.enforce_display_limit(limit);
        }

        self.append_local(Message::assistant(WELCOME_MESSAGE), limit)?;
        self.persist_transcript().await?;
        self.view.toast(&Toast::success("System initialized successfully!"));
        Ok(())
    }

    /// Submit one line of user input.
    ///
    /// Never returns an error: presentation failures are rendered as the
    /// generic error message and reported through a toast.
    pub async fn submit(&self, raw: &str, cancel: &CancellationToken) -> SubmitOutcome {
        let text = raw.trim();
        if text.is_empty() {
            return SubmitOutcome::Rejected(RejectReason::Empty);
        }
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Submission rejected, exchange in progress");
            return SubmitOutcome::Rejected(RejectReason::Busy);
        }
        let _guard = ExchangeGuard(&self.in_progress);

        match self.exchange(text, cancel).await {
            Ok(outcome) => SubmitOutcome::Replied(outcome),
            Err(e) => {
                error!(error = %e, "Failed to complete exchange");
                self.view.set_typing(false);
                let limit = self.settings().effective_message_limit();
                if let Err(render_err) = self.append_local(Message::assistant(GENERIC_ERROR_MESSAGE), limit) {
                    warn!(error = %render_err, "Could not render error message");
                }
                self.view.toast(&Toast::error("Error sending message"));
                SubmitOutcome::Failed(e.to_string())
            }
        }
    }

    async fn exchange(&self, text: &str, cancel: &CancellationToken) -> Result<SendOutcome, ChatError> {
        let settings = self.settings();
        let limit = settings.effective_message_limit();

        let user = Message::user(text);
        self.view.render_message(&user, true)?;
        self.enforce_display_limit(limit);
        self.view.set_typing(true);

        let outcome = self.client.send(text, settings.include_context, cancel).await;
        if !outcome.success {
            // The client only logs successful round trips.
            let mut log = lock_log(self.client.log());
            log.push_local(user);
            log.push_local(Message::assistant(outcome.response.clone()));
        }

        tokio::time::sleep(Duration::from_millis(settings.effective_response_delay_ms())).await;
        self.view.set_typing(false);

        self.view
            .render_message(&Message::assistant(outcome.response.clone()), true)?;
        self.enforce_display_limit(limit);
        self.persist_transcript().await?;

        if settings.voice_enabled {
            self.speech.speak(&outcome.response, settings.voice_speed);
        }
        Ok(outcome)
    }

    /// Empty the view, the log and the persisted transcript.
    pub async fn clear_chat(&self) -> Result<(), ChatError> {
        self.view.clear();
        self.client.clear_history();
        self.persist_transcript().await?;
        info!("Chat cleared");
        self.view.toast(&Toast::info("Chat cleared"));
        Ok(())
    }

    /// Wipe the whole store (settings, endpoint, transcript) and reset to
    /// defaults.
    pub async fn clear_all_data(&self) -> Result<(), ChatError> {
        self.speech.stop();
        self.store.clear().await?;
        self.view.clear();
        self.client.clear_history();
        self.client.reset_endpoint();

        let defaults = Settings::default();
        lock_log(self.client.log()).set_retention(defaults.effective_message_limit());
        self.speech.set_engine(&defaults.tts_engine);
        *self
            .settings
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = defaults;

        info!("All data cleared");
        self.view.toast(&Toast::info("All data cleared"));
        Ok(())
    }

    /// Snapshot of the displayed transcript.
    pub fn export(&self) -> ChatExport {
        let limit = self.settings().effective_message_limit();
        let messages = lock_log(self.client.log())
            .display_window(limit)
            .iter()
            .map(|entry| entry.message.clone())
            .collect();
        ChatExport::new(messages, Utc::now())
    }

    /// Displayed transcript entries, oldest first.
    pub fn transcript(&self) -> Vec<LogEntry> {
        let limit = self.settings().effective_message_limit();
        lock_log(self.client.log()).display_window(limit).to_vec()
    }

    /// Apply endpoint, credential and toggles together.
    pub async fn save_settings(&self, endpoint: &str, api_key: &str, settings: Settings) -> Result<(), ChatError> {
        self.client.configure(endpoint, api_key).await?;
        self.apply_settings(settings).await?;
        self.view.toast(&Toast::success("Settings saved"));
        Ok(())
    }

    /// Change toggles in place and persist them.
    pub async fn update_settings<F>(&self, change: F) -> Result<Settings, ChatError>
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.settings();
        change(&mut settings);
        self.apply_settings(settings.clone()).await?;
        Ok(settings)
    }

    /// Change toggles for this session only; nothing is persisted.
    pub fn adjust_settings<F>(&self, change: F) -> Settings
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self
            .settings
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        change(&mut settings);
        lock_log(self.client.log()).set_retention(settings.effective_message_limit());
        self.speech.set_engine(&settings.tts_engine);
        settings.clone()
    }

    /// Probe the endpoint and toast the result.
    pub async fn test_connection(&self) -> ConnectionStatus {
        let status = self.client.test_connection().await;
        let toast = if status.success {
            Toast::success(status.message.clone())
        } else {
            Toast::error(status.message.clone())
        };
        self.view.toast(&toast);
        status
    }

    /// Stop any utterance in progress.
    pub fn stop_speech(&self) {
        self.speech.stop();
    }

    async fn apply_settings(&self, settings: Settings) -> Result<(), ChatError> {
        let value = serde_json::to_value(&settings)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set(SETTINGS_KEY, &value).await?;

        let limit = settings.effective_message_limit();
        lock_log(self.client.log()).set_retention(limit);
        self.enforce_display_limit(limit);
        self.speech.set_engine(&settings.tts_engine);

        debug!(
            message_limit = limit,
            include_context = settings.include_context,
            voice_enabled = settings.voice_enabled,
            "Settings applied"
        );
        *self
            .settings
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = settings;
        Ok(())
    }

    fn append_local(&self, message: Message, limit: usize) -> Result<(), ChatError> {
        self.view.render_message(&message, true)?;
        lock_log(self.client.log()).push_local(message);
        self.enforce_display_limit(limit);
        Ok(())
    }

    fn enforce_display_limit(&self, limit: usize) {
        while self.view.rendered_count() > limit {
            self.view.evict_oldest();
        }
    }

    async fn persist_transcript(&self) -> Result<(), ChatError> {
        let value = {
            let log = lock_log(self.client.log());
            serde_json::to_value(log.entries())
        }
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set(CHAT_HISTORY_KEY, &value).await?;
        Ok(())
    }

    async fn load_transcript(&self) -> Result<Vec<LogEntry>, ChatError> {
        let Some(value) = self.store.get(CHAT_HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_value::<Vec<LogEntry>>(value) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(error = %e, "Stored transcript is unreadable, starting empty");
                Ok(Vec::new())
            }
        }
    }
}

/// Read persisted settings, falling back to defaults when absent or
/// unreadable.
pub async fn load_settings<S: KvStore>(store: &S) -> Settings {
    match store.get(SETTINGS_KEY).await {
        Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(error = %e, "Stored settings are unreadable, using defaults");
            Settings::default()
        }),
        Ok(None) => Settings::default(),
        Err(e) => {
            warn!(error = %e, "Failed to read settings, using defaults");
            Settings::default()
        }
    }
}
