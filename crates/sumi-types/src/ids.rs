//! Typed session identifier.
//!
//! Wraps UUIDv7 (time-ordered, globally unique). Opaque in storage keys and
//! logs; displays as standard UUID text. The `short()` form (first 8 hex
//! chars) is for human-facing UI only — never used as a lookup key.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A session identifier (UUIDv7).
///
/// One per live editor instance. Hosts that want per-document persistence
/// without choosing a storage key themselves can pass `SessionId::new()`
/// as the session id and let the key derive from it.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    /// Create a new time-ordered ID (UUIDv7).
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// First 8 hex characters — for human display only, not lookup.
    pub fn short(&self) -> String {
        self.0.as_simple().to_string()[..8].to_string()
    }

    /// Full 32-character hex string (no hyphens).
    pub fn to_hex(&self) -> String {
        self.0.as_simple().to_string()
    }

    /// Parse from a hex string (32 chars, no hyphens) or standard UUID format.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        uuid::Uuid::parse_str(s).map(Self)
    }

    /// A nil / zero ID — for sentinel values only.
    pub fn nil() -> Self {
        Self(uuid::Uuid::nil())
    }

    /// Check if this is the nil ID.
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<uuid::Uuid> for SessionId {
    fn from(u: uuid::Uuid) -> Self {
        Self(u)
    }
}

impl From<SessionId> for uuid::Uuid {
    fn from(id: SessionId) -> uuid::Uuid {
        id.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Full UUID with hyphens for log readability
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.short())
    }
}

// ============================================================================
// Tests
// ============================================================================
