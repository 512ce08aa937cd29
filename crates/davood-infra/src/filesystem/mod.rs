//! Data directory layout.

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "DAVOOD_DATA_DIR";

/// Resolve the data directory.
///
/// Priority:
/// 1. Explicit override (the `--data-dir` flag)
/// 2. `DAVOOD_DATA_DIR` environment variable
/// 3. `~/.davood`
pub fn resolve_data_dir(override_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }

    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".davood");
    }

    // Last resort: current directory
    PathBuf::from(".davood")
}

/// `{data_dir}/storage.json`, the persisted key-value store.
pub fn storage_path(data_dir: &Path) -> PathBuf {
    data_dir.join("storage.json")
}

/// `{data_dir}/config.toml`.
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}
