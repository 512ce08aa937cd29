//! Global configuration loader for DavoodAI.
//!
//! Reads `config.toml` from the data directory (`~/.davood/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::Path;
use std::time::Duration;

use davood_types::config::GlobalConfig;

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = crate::filesystem::config_path(data_dir);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Request deadline from config. Zero is treated as "no deadline".
pub fn resolve_request_timeout(config: &GlobalConfig) -> Option<Duration> {
    config
        .request_timeout_secs
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use davood_types::config::DEFAULT_ENDPOINT;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_global_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.default_endpoint, DEFAULT_ENDPOINT);
        assert!(config.request_timeout_secs.is_none());
    }

    #[tokio::test]
    async fn load_global_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
default_endpoint = "http://10.0.0.5:5000/api/chat"
request_timeout_secs = 20

[speech]
program = "espeak"
"#,
        )
        .await
        .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.default_endpoint, "http://10.0.0.5:5000/api/chat");
        assert_eq!(config.request_timeout_secs, Some(20));
        assert_eq!(config.speech.program.as_deref(), Some("espeak"));
    }

    #[tokio::test]
    async fn load_global_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.default_endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn resolve_request_timeout_ignores_zero() {
        let mut config = GlobalConfig::default();
        assert_eq!(resolve_request_timeout(&config), None);
        config.request_timeout_secs = Some(0);
        assert_eq!(resolve_request_timeout(&config), None);
        config.request_timeout_secs = Some(15);
        assert_eq!(resolve_request_timeout(&config), Some(Duration::from_secs(15)));
    }
}
