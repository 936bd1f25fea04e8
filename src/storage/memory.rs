//! In-process storage backend
//!
//! Backs `--ephemeral` runs and tests. Contents vanish with the process.

use super::traits::{DurableStore, StorageResult, StoredEntry};
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

/// DashMap-backed key/value store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing entries (simulates a prior lifetime)
    pub fn with_entries(entries: impl IntoIterator<Item = StoredEntry>) -> Self {
        let store = Self::new();
        for (key, value) in entries {
            store.entries.insert(key, value);
        }
        store
    }

    /// Get a single value by key
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|r| r.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn read_all(&self) -> StorageResult<Vec<StoredEntry>> {
        Ok(self
            .entries
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect())
    }

    async fn write(&self, key: &str, value: &Value) -> StorageResult<()> {
        self.entries.insert(key.to_string(), value.clone());
        Ok(())
    }
}
