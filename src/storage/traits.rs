//! Storage trait definitions

use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A single persisted key and its JSON value
pub type StoredEntry = (String, Value);

/// Trait for durable key/value backends
///
/// The store knows nothing about namespaces or result shapes; callers
/// pick the keys. Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Read every persisted entry.
    async fn read_all(&self) -> StorageResult<Vec<StoredEntry>>;

    /// Insert or overwrite a single key.
    async fn write(&self, key: &str, value: &Value) -> StorageResult<()>;
}

/// Extension trait for opening stores from paths
pub trait OpenStore: DurableStore + Sized {
    /// Open or create a store at the given path
    fn open(path: impl AsRef<Path>) -> StorageResult<Self>;

    /// Create an in-memory store (useful for testing)
    fn open_in_memory() -> StorageResult<Self>;
}
