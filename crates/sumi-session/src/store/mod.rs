//! Snapshot persistence collaborator.
//!
//! A [`SnapshotStore`] is a key-value map from storage key to the latest
//! document snapshot. No versioning — last write wins. The session writes
//! through it on debounce flushes and reads from it once at hydration.
//!
//! Shipped implementations: [`MemoryStore`] (concurrent map, optional byte
//! quota) and [`SqliteStore`] (single-table rusqlite). Hosts with their own
//! storage implement the trait instead.

use async_trait::async_trait;
use sumi_types::Content;

use crate::error::PersistenceError;

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, PersistenceError>;

/// Key-value snapshot storage.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Read the snapshot under `key`, if any.
    async fn get(&self, key: &str) -> StoreResult<Option<Content>>;

    /// Write the snapshot under `key`, unconditionally overwriting any
    /// prior value.
    async fn set(&self, key: &str, content: &Content) -> StoreResult<()>;
}
