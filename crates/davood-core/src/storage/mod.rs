//! Durable key-value storage port and the keys the client persists.

pub mod kv_store;

/// Persisted endpoint URL (JSON string).
pub const API_ENDPOINT_KEY: &str = "apiEndpoint";

/// Persisted bearer credential (JSON string, empty when unset).
pub const API_KEY_KEY: &str = "apiKey";

/// Persisted transcript (JSON array of log entries).
pub const CHAT_HISTORY_KEY: &str = "chatHistory";

/// Persisted runtime settings (JSON object).
pub const SETTINGS_KEY: &str = "settings";
