//! Document-engine collaborator contract.
//!
//! The session controller never edits text itself — it drives a host editor
//! library through this trait: replace content on hydration, insert streamed
//! completion diffs at the cursor, delete ranges on rollback, and observe
//! every change through a broadcast stream. Positions are character offsets
//! throughout, matching [`Selection`].
//!
//! [`PlainTextEngine`] is the shipped reference implementation; real hosts
//! wrap their editor library instead.

use sumi_types::{ChangeEvent, Content, Selection};
use tokio::sync::broadcast;

mod plain_text;

pub use plain_text::PlainTextEngine;

/// Operation surface the controller needs from a rich-text engine.
///
/// Implementations must be internally synchronized: the update loop, the
/// completion bridge, and interrupt dispatch all call in from different
/// tasks.
pub trait DocumentEngine: Send + Sync {
    /// Current document snapshot.
    fn content(&self) -> Content;

    /// Replace the whole document.
    ///
    /// With `emit_change` false the replacement does not enter the change
    /// stream — hydration uses this so loading content never triggers
    /// callbacks or a save of what was just loaded.
    fn set_content(&self, content: &Content, emit_change: bool);

    /// Insert text at the cursor, replacing any active selection. The cursor
    /// ends up after the inserted text.
    fn insert_content(&self, text: &str);

    /// Delete the character range `[from, to)`.
    fn delete_range(&self, from: usize, to: usize);

    /// Current selection bounds.
    fn selection(&self) -> Selection;

    /// Document flattened to plain text (for completion prompt seeding).
    fn plain_text(&self) -> String;

    /// Subscribe to change events. Each subscriber gets every event from
    /// subscription time on; events carry the post-edit document.
    fn subscribe_changes(&self) -> broadcast::Receiver<ChangeEvent>;
}
