//! Change events broadcast by document engines.
//!
//! Every edit the engine applies produces one `ChangeEvent` carrying the
//! post-edit document and a small transaction summary. Events are cloned per
//! subscriber, so they stay cheap: the summary is counts and an origin tag,
//! not an edit script.

use serde::{Deserialize, Serialize};

use crate::content::Content;

/// What kind of edit produced a change event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditOrigin {
    /// Whole-document replacement.
    Replace,
    /// Insertion at the cursor.
    Insert,
    /// Range deletion.
    Delete,
}

impl EditOrigin {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            EditOrigin::Replace => "replace",
            EditOrigin::Insert => "insert",
            EditOrigin::Delete => "delete",
        }
    }
}

impl std::fmt::Display for EditOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Summary of one applied edit.
///
/// Counts are in characters, not bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// What kind of edit this was.
    pub origin: EditOrigin,
    /// Characters inserted.
    pub inserted: usize,
    /// Characters deleted.
    pub deleted: usize,
}

impl Transaction {
    pub fn insert(inserted: usize) -> Self {
        Self {
            origin: EditOrigin::Insert,
            inserted,
            deleted: 0,
        }
    }

    pub fn delete(deleted: usize) -> Self {
        Self {
            origin: EditOrigin::Delete,
            inserted: 0,
            deleted,
        }
    }

    pub fn replace(inserted: usize, deleted: usize) -> Self {
        Self {
            origin: EditOrigin::Replace,
            inserted,
            deleted,
        }
    }
}

/// One change notification from a document engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Document state after the edit.
    pub document: Content,
    /// Summary of the edit that produced this event.
    pub transaction: Transaction,
}

impl ChangeEvent {
    pub fn new(document: Content, transaction: Transaction) -> Self {
        Self {
            document,
            transaction,
        }
    }
}

/// Selection bounds in character positions, `from <= to`.
///
/// A collapsed selection (`from == to`) is the caret.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub from: usize,
    pub to: usize,
}

impl Selection {
    /// Create a selection; swaps the bounds if given in reverse order.
    pub fn new(from: usize, to: usize) -> Self {
        if from <= to {
            Self { from, to }
        } else {
            Self { from: to, to: from }
        }
    }

    /// A collapsed selection at `pos`.
    pub fn caret(pos: usize) -> Self {
        Self { from: pos, to: pos }
    }

    /// Whether the selection is collapsed.
    pub fn is_caret(&self) -> bool {
        self.from == self.to
    }

    /// Characters covered.
    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Tests
// ============================================================================
