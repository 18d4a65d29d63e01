//! In-memory snapshot store.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use sumi_types::Content;

use crate::error::PersistenceError;

use super::{SnapshotStore, StoreResult};

/// Concurrent in-memory store with an optional byte quota.
///
/// The quota counts JSON-encoded snapshot sizes, summed over all keys —
/// the browser-localStorage failure mode, reproducible in tests. Reads go
/// straight to the map; writes serialize through the accounting lock.
pub struct MemoryStore {
    entries: DashMap<String, Content>,
    /// (used bytes, per-key encoded sizes) — guarded together so quota
    /// checks and inserts stay consistent under concurrent writers.
    accounting: Mutex<Accounting>,
    capacity: Option<usize>,
}

#[derive(Default)]
struct Accounting {
    used: usize,
    sizes: std::collections::HashMap<String, usize>,
}

impl MemoryStore {
    /// Unbounded store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            accounting: Mutex::new(Accounting::default()),
            capacity: None,
        }
    }

    /// Store that rejects writes once encoded snapshots would exceed
    /// `capacity` bytes in total.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::new(),
            accounting: Mutex::new(Accounting::default()),
            capacity: Some(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Content>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, content: &Content) -> StoreResult<()> {
        let encoded = serde_json::to_string(content)?;

        let mut accounting = self.accounting.lock();
        let old = accounting.sizes.get(key).copied().unwrap_or(0);
        let projected = accounting.used - old + encoded.len();
        if let Some(capacity) = self.capacity {
            if projected > capacity {
                return Err(PersistenceError::QuotaExceeded {
                    needed: projected,
                    capacity,
                });
            }
        }

        self.entries.insert(key.to_string(), content.clone());
        accounting.sizes.insert(key.to_string(), encoded.len());
        accounting.used = projected;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_key_is_none() {
        let store = MemoryStore::new();
        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemoryStore::new();
        store.set("doc", &Content::from("hello")).await.unwrap();
        assert_eq!(
            store.get("doc").await.unwrap(),
            Some(Content::from("hello"))
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_overwrite_last_write_wins() {
        let store = MemoryStore::new();
        store.set("doc", &Content::from("v1")).await.unwrap();
        store.set("doc", &Content::from("v2")).await.unwrap();
        assert_eq!(store.get("doc").await.unwrap(), Some(Content::from("v2")));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_quota_rejects_oversized_write() {
        let store = MemoryStore::with_capacity(16);
        let big = Content::from("x".repeat(64));
        let err = store.set("doc", &big).await.unwrap_err();
        assert!(matches!(
            err,
            PersistenceError::QuotaExceeded { capacity: 16, .. }
        ));
        // Nothing was stored
        assert!(store.get("doc").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_quota_overwrite_releases_old_size() {
        // "\"xxxxxxxx\"" encodes to 10 bytes; capacity fits one such value
        let store = MemoryStore::with_capacity(12);
        store.set("doc", &Content::from("x".repeat(8))).await.unwrap();
        // Same key, same size: replacing must not double-count
        store.set("doc", &Content::from("y".repeat(8))).await.unwrap();
        assert_eq!(
            store.get("doc").await.unwrap(),
            Some(Content::from("y".repeat(8)))
        );
        // A second key would blow the budget
        let err = store.set("other", &Content::from("z".repeat(8))).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_tree_content_roundtrip() {
        let store = MemoryStore::new();
        let tree = Content::Tree(serde_json::json!({
            "type": "doc",
            "content": [{"type": "paragraph"}]
        }));
        store.set("doc", &tree).await.unwrap();
        assert_eq!(store.get("doc").await.unwrap(), Some(tree));
    }
}
