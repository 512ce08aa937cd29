//! Application state wiring the chat session together.
//!
//! `ChatSession` is generic over transport, store, view and speech; the CLI
//! pins it to the concrete infra implementations here.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use davood_core::chat::client::SessionClient;
use davood_core::chat::log::ConversationLog;
use davood_core::chat::session::{ChatSession, load_settings};
use davood_infra::config::{load_global_config, resolve_request_timeout};
use davood_infra::filesystem::{resolve_data_dir, storage_path};
use davood_infra::http::HttpTransport;
use davood_infra::kv::JsonFileKvStore;
use davood_infra::speech::CommandSpeaker;
use davood_types::config::GlobalConfig;

use crate::cli::chat::view::TerminalView;

pub type ConcreteSession =
    ChatSession<HttpTransport, JsonFileKvStore, Arc<TerminalView>, Arc<CommandSpeaker>>;

/// Shared state for every command: where data lives, the global config and
/// the persisted store.
pub struct AppState {
    pub data_dir: PathBuf,
    pub config: GlobalConfig,
    pub store: Arc<JsonFileKvStore>,
}

impl AppState {
    /// Resolve the data directory, load `config.toml` and open the store.
    pub async fn init(data_dir_override: Option<&Path>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir(data_dir_override);
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let config = load_global_config(&data_dir).await;
        let store = JsonFileKvStore::open(storage_path(&data_dir))
            .await
            .context("Failed to open storage")?;
        let store = Arc::new(store);
        tracing::debug!(data_dir = %data_dir.display(), "Application state initialized");

        Ok(Self {
            data_dir,
            config,
            store,
        })
    }

    /// Build a session rendering through `view`, with persisted settings,
    /// endpoint and credential applied.
    pub async fn build_session(&self, view: Arc<TerminalView>) -> anyhow::Result<ConcreteSession> {
        let settings = load_settings(self.store.as_ref()).await;
        let log = ConversationLog::new(settings.effective_message_limit()).shared();

        let transport = HttpTransport::new().context("Failed to build HTTP client")?;
        let client = SessionClient::load(
            transport,
            self.store.clone(),
            &self.config.default_endpoint,
            log,
        )
        .await?
        .with_request_timeout(resolve_request_timeout(&self.config));

        let speaker = Arc::new(CommandSpeaker::new(
            settings.tts_engine.clone(),
            self.config.speech.clone(),
        ));

        Ok(ChatSession::new(
            client,
            self.store.clone(),
            view,
            speaker,
            settings,
        ))
    }
}
