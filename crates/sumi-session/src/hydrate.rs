//! One-shot initial content load.
//!
//! A session starts `Uninitialized` and flips to `Hydrated` at most once, when
//! a non-empty content source is found. The source is the persisted snapshot
//! (falling back to the configured default when the key is missing), or the
//! default alone when persistence is disabled. An empty source leaves the
//! session `Uninitialized`; callers may retry after seeding the store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use sumi_types::Content;
use tracing::debug;

use crate::engine::DocumentEngine;
use crate::error::PersistenceError;
use crate::store::SnapshotStore;

pub struct Hydrator {
    engine: Arc<dyn DocumentEngine>,
    store: Arc<dyn SnapshotStore>,
    storage_key: String,
    default_value: Content,
    persistence_disabled: bool,
    hydrated: AtomicBool,
}

impl Hydrator {
    pub fn new(
        engine: Arc<dyn DocumentEngine>,
        store: Arc<dyn SnapshotStore>,
        storage_key: impl Into<String>,
        default_value: Content,
        persistence_disabled: bool,
    ) -> Self {
        Self {
            engine,
            store,
            storage_key: storage_key.into(),
            default_value,
            persistence_disabled,
            hydrated: AtomicBool::new(false),
        }
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated.load(Ordering::Acquire)
    }

    /// Attempt the `Uninitialized -> Hydrated` transition.
    ///
    /// Returns `Ok(true)` once hydrated (including on repeat calls), and
    /// `Ok(false)` when every available source is empty. The empty case is
    /// retriable. Content replacement suppresses change notification, so
    /// hydration never triggers the update callbacks or a snapshot write.
    pub async fn try_hydrate(&self) -> Result<bool, PersistenceError> {
        if self.is_hydrated() {
            return Ok(true);
        }

        let content = if self.persistence_disabled {
            self.default_value.clone()
        } else {
            self.store
                .get(&self.storage_key)
                .await?
                .unwrap_or_else(|| self.default_value.clone())
        };

        if content.is_empty() {
            return Ok(false);
        }

        if self
            .hydrated
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            // Lost a race with a concurrent hydration; first writer wins.
            return Ok(true);
        }

        self.engine.set_content(&content, false);
        debug!(key = %self.storage_key, "session hydrated");
        Ok(true)
    }
}

impl std::fmt::Debug for Hydrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hydrator")
            .field("storage_key", &self.storage_key)
            .field("persistence_disabled", &self.persistence_disabled)
            .field("hydrated", &self.is_hydrated())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
