//! Key-value store trait.
//!
//! Defines the interface for the client's durable key-value storage.
//! Implementations live in davood-infra.

use davood_types::error::StorageError;

/// Trait for durable key-value storage of JSON values.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait KvStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<serde_json::Value>, StorageError>> + Send;

    /// Set a value for a key (upsert).
    fn set(
        &self,
        key: &str,
        value: &serde_json::Value,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    /// Delete a key. No-op if key does not exist.
    fn delete(&self, key: &str) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    /// Remove every key.
    fn clear(&self) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    /// List all keys, sorted.
    fn list_keys(&self) -> impl std::future::Future<Output = Result<Vec<String>, StorageError>> + Send;
}
