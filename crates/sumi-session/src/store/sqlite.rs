//! SQLite snapshot store.
//!
//! One table keyed by storage key; snapshots are JSON-encoded [`Content`].
//! Suits desktop hosts that want documents to survive restarts without an
//! external service.

use std::path::Path;

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection, Result as SqliteResult};
use sumi_types::Content;

use super::{SnapshotStore, StoreResult};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS snapshots (
    key TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    updated_at INTEGER DEFAULT (unixepoch())
);
"#;

/// Snapshot store backed by a SQLite database.
///
/// The connection is mutex-guarded; statements are short enough that
/// blocking inside the async trait methods is not worth a pool.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> SqliteResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> SqliteResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Unix timestamp of the last write to `key`, if any.
    pub fn updated_at(&self, key: &str) -> SqliteResult<Option<i64>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT updated_at FROM snapshots WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SnapshotStore for SqliteStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Content>> {
        let encoded: Option<String> = {
            let conn = self.conn.lock();
            let mut stmt = conn.prepare("SELECT content FROM snapshots WHERE key = ?1")?;
            let mut rows = stmt.query(params![key])?;
            match rows.next()? {
                Some(row) => Some(row.get(0)?),
                None => None,
            }
        };
        match encoded {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, content: &Content) -> StoreResult<()> {
        let encoded = serde_json::to_string(content)?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO snapshots (key, content) VALUES (?1, ?2)",
            params![key, encoded],
        )?;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
