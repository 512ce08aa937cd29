//! Configuration types for DavoodAI.
//!
//! `GlobalConfig` is the static `config.toml` in the data directory.
//! `Settings` holds the runtime toggles a user flips from the chat loop or
//! `davood config set`; it is persisted in the key-value store.

use serde::{Deserialize, Serialize};

/// Endpoint used until the user configures one.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/api/chat";

/// Artificial "thinking" delay applied after every exchange.
pub const DEFAULT_RESPONSE_DELAY_MS: u64 = 1500;

/// Maximum number of rendered messages.
pub const DEFAULT_MESSAGE_LIMIT: usize = 100;

/// Top-level configuration, loaded from `~/.davood/config.toml`.
///
/// All fields have defaults; a missing file is equivalent to an empty one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Endpoint used when none has been persisted yet.
    #[serde(default = "default_endpoint")]
    pub default_endpoint: String,

    /// Deadline for a single backend request. Unset means no deadline.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// External speech program overriding the engine's built-in command.
    #[serde(default)]
    pub speech: SpeechCommandConfig,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            default_endpoint: default_endpoint(),
            request_timeout_secs: None,
            speech: SpeechCommandConfig::default(),
        }
    }
}

/// A user-supplied text-to-speech command.
///
/// The text is appended as the last argument.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeechCommandConfig {
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Runtime settings persisted under the `settings` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_response_delay_ms")]
    pub response_delay_ms: u64,
    #[serde(default = "default_message_limit")]
    pub message_limit: usize,
    #[serde(default = "default_true")]
    pub include_context: bool,
    #[serde(default = "default_true")]
    pub voice_enabled: bool,
    #[serde(default = "default_voice_speed")]
    pub voice_speed: f32,
    #[serde(default = "default_tts_engine")]
    pub tts_engine: String,
    #[serde(default = "default_true")]
    pub particles: bool,
    #[serde(default = "default_true")]
    pub animations: bool,
}

fn default_response_delay_ms() -> u64 {
    DEFAULT_RESPONSE_DELAY_MS
}

fn default_message_limit() -> usize {
    DEFAULT_MESSAGE_LIMIT
}

fn default_true() -> bool {
    true
}

fn default_voice_speed() -> f32 {
    1.0
}

fn default_tts_engine() -> String {
    "edge".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            response_delay_ms: default_response_delay_ms(),
            message_limit: default_message_limit(),
            include_context: true,
            voice_enabled: true,
            voice_speed: default_voice_speed(),
            tts_engine: default_tts_engine(),
            particles: true,
            animations: true,
        }
    }
}

impl Settings {
    /// Delay in effect. Zero falls back to the default, as an empty field
    /// always did.
    pub fn effective_response_delay_ms(&self) -> u64 {
        if self.response_delay_ms == 0 {
            DEFAULT_RESPONSE_DELAY_MS
        } else {
            self.response_delay_ms
        }
    }

    /// Display limit in effect. Zero falls back to the default.
    pub fn effective_message_limit(&self) -> usize {
        if self.message_limit == 0 {
            DEFAULT_MESSAGE_LIMIT
        } else {
            self.message_limit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_config_default_values() {
        let config = GlobalConfig::default();
        assert_eq!(config.default_endpoint, DEFAULT_ENDPOINT);
        assert!(config.request_timeout_secs.is_none());
        assert!(config.speech.program.is_none());
    }

    #[test]
    fn test_global_config_deserialize_with_defaults() {
        let config: GlobalConfig = toml::from_str("").unwrap();
        assert_eq!(config.default_endpoint, DEFAULT_ENDPOINT);
        assert!(config.speech.args.is_empty());
    }

    #[test]
    fn test_global_config_deserialize_with_values() {
        let toml_str = r#"
default_endpoint = "https://bot.example.com/api/chat"
request_timeout_secs = 30

[speech]
program = "espeak-ng"
args = ["-v", "en-us"]
"#;
        let config: GlobalConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_endpoint, "https://bot.example.com/api/chat");
        assert_eq!(config.request_timeout_secs, Some(30));
        assert_eq!(config.speech.program.as_deref(), Some("espeak-ng"));
        assert_eq!(config.speech.args, vec!["-v", "en-us"]);
    }

    #[test]
    fn test_settings_partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"message_limit": 5, "voice_enabled": false}"#).unwrap();
        assert_eq!(settings.message_limit, 5);
        assert!(!settings.voice_enabled);
        assert_eq!(settings.response_delay_ms, 1500);
        assert!(settings.include_context);
        assert_eq!(settings.tts_engine, "edge");
    }

    #[test]
    fn test_zero_values_fall_back_to_defaults() {
        let settings = Settings {
            response_delay_ms: 0,
            message_limit: 0,
            ..Settings::default()
        };
        assert_eq!(settings.effective_response_delay_ms(), 1500);
        assert_eq!(settings.effective_message_limit(), 100);
    }
}
