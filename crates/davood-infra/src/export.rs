//! Writes chat exports to disk.

use std::path::{Path, PathBuf};

use davood_types::chat::ChatExport;
use davood_types::error::StorageError;

/// Write `export` pretty-printed into `dir`, named after the export date.
///
/// An existing file for the same day is overwritten. Returns the full path.
pub async fn write_export(dir: &Path, export: &ChatExport) -> Result<PathBuf, StorageError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| StorageError::Io(format!("{}: {e}", dir.display())))?;

    let path = dir.join(ChatExport::file_name(export.export_date.date_naive()));
    let content = serde_json::to_string_pretty(export)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    tokio::fs::write(&path, content)
        .await
        .map_err(|e| StorageError::Io(format!("{}: {e}", path.display())))?;

    tracing::info!(path = %path.display(), messages = export.total_messages, "Chat exported");
    Ok(path)
}
