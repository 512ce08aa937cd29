//! In-memory key-value store, used when nothing should touch disk.

use std::collections::BTreeMap;

use davood_core::storage::kv_store::KvStore;
use davood_types::error::StorageError;
use tokio::sync::Mutex;

#[derive(Default)]
pub struct MemoryKvStore {
    values: Mutex<BTreeMap<String, serde_json::Value>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StorageError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &serde_json::Value) -> Result<(), StorageError> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.values.lock().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        self.values.lock().await.clear();
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.values.lock().await.keys().cloned().collect())
    }
}
