//! In-memory implementation of `KvStore`.
//!
//! Mirrors browser storage limits: when a quota is set, a write that would
//! push the total size of keys and values past it is refused and the previous
//! value stays in place.

use async_trait::async_trait;
use dashmap::DashMap;
use domains::{KvStore, StorageError};

#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: DashMap<String, String>,
    /// Maximum total bytes across keys and values. `None` means unbounded.
    quota_bytes: Option<usize>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: DashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Current footprint in bytes, counted as key length plus value length.
    pub fn used_bytes(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.key().len() + e.value().len())
            .sum()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        if let Some(limit) = self.quota_bytes {
            let replaced = self
                .entries
                .get(key)
                .map(|v| key.len() + v.value().len())
                .unwrap_or(0);
            let needed = self.used_bytes() - replaced + key.len() + value.len();
            if needed > limit {
                tracing::warn!(key, needed, limit, "memory store quota exceeded");
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}
