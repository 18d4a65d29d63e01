//! In-memory plain-text reference engine.
//!
//! Backs tests and headless hosts. Structured trees are flattened to plain
//! text on `set_content`; everything else is a string with a cursor.

use parking_lot::Mutex;
use sumi_types::{ChangeEvent, Content, Selection, Transaction};
use tokio::sync::broadcast;

use super::DocumentEngine;

/// Event channel capacity. Lagging subscribers lose oldest events first.
const EVENT_CAPACITY: usize = 1024;

struct EngineState {
    text: String,
    selection: Selection,
}

/// A minimal [`DocumentEngine`] over a `String` and a cursor.
///
/// All positions are character offsets. Mutations broadcast a
/// [`ChangeEvent`] while holding the state lock, so subscribers observe
/// events in application order.
pub struct PlainTextEngine {
    state: Mutex<EngineState>,
    event_tx: broadcast::Sender<ChangeEvent>,
}

impl PlainTextEngine {
    /// Create an empty engine with the cursor at 0.
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Mutex::new(EngineState {
                text: String::new(),
                selection: Selection::caret(0),
            }),
            event_tx,
        }
    }

    /// Create an engine seeded with content, cursor at the end.
    pub fn with_content(content: &Content) -> Self {
        let engine = Self::new();
        engine.set_content(content, false);
        engine
    }

    /// Move the selection, clamped to the document bounds.
    ///
    /// Not part of [`DocumentEngine`] — the controller only reads the
    /// selection; hosts and tests position it.
    pub fn set_selection(&self, selection: Selection) {
        let mut state = self.state.lock();
        let len = state.text.chars().count();
        state.selection = Selection::new(selection.from.min(len), selection.to.min(len));
    }

    /// Character count of the document.
    pub fn char_len(&self) -> usize {
        self.state.lock().text.chars().count()
    }
}

impl Default for PlainTextEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte offset of character `ch`, saturating to the end of the string.
fn byte_of(text: &str, ch: usize) -> usize {
    text.char_indices().nth(ch).map_or(text.len(), |(i, _)| i)
}

impl DocumentEngine for PlainTextEngine {
    fn content(&self) -> Content {
        Content::Text(self.state.lock().text.clone())
    }

    fn set_content(&self, content: &Content, emit_change: bool) {
        let mut state = self.state.lock();
        let deleted = state.text.chars().count();
        state.text = content.plain_text();
        let len = state.text.chars().count();
        state.selection = Selection::caret(len);
        if emit_change {
            let event = ChangeEvent::new(
                Content::Text(state.text.clone()),
                Transaction::replace(len, deleted),
            );
            let _ = self.event_tx.send(event);
        }
    }

    fn insert_content(&self, text: &str) {
        let mut state = self.state.lock();
        let Selection { from, to } = state.selection;
        let start = byte_of(&state.text, from);
        let end = byte_of(&state.text, to);
        state.text.replace_range(start..end, text);

        let inserted = text.chars().count();
        state.selection = Selection::caret(from + inserted);
        let event = ChangeEvent::new(
            Content::Text(state.text.clone()),
            Transaction {
                origin: sumi_types::EditOrigin::Insert,
                inserted,
                deleted: to - from,
            },
        );
        let _ = self.event_tx.send(event);
    }

    fn delete_range(&self, from: usize, to: usize) {
        let mut state = self.state.lock();
        let len = state.text.chars().count();
        let from = from.min(len);
        let to = to.min(len);
        if from >= to {
            return;
        }
        let start = byte_of(&state.text, from);
        let end = byte_of(&state.text, to);
        state.text.replace_range(start..end, "");
        state.selection = Selection::caret(from);
        let event = ChangeEvent::new(
            Content::Text(state.text.clone()),
            Transaction::delete(to - from),
        );
        let _ = self.event_tx.send(event);
    }

    fn selection(&self) -> Selection {
        self.state.lock().selection
    }

    fn plain_text(&self) -> String {
        self.state.lock().text.clone()
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<ChangeEvent> {
        self.event_tx.subscribe()
    }
}

// ============================================================================
// Tests
// ============================================================================
