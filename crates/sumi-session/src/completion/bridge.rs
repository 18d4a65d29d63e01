//! Stream-to-document bridge.
//!
//! Watches the cumulative completion text and inserts only the unseen suffix
//! into the document at the cursor. `inserted_len` tracks how many bytes of
//! the current generation have already been inserted; a generation change
//! resets it to zero. Because the text is cumulative and append-only within a
//! generation, the watch channel may coalesce bursts without losing a byte.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::CompletionFrame;
use crate::engine::DocumentEngine;

pub(crate) fn spawn_stream_bridge(
    engine: Arc<dyn DocumentEngine>,
    mut frames: watch::Receiver<CompletionFrame>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut generation = frames.borrow().generation;
        let mut inserted_len = 0usize;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = frames.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let (r#gen, text) = {
                        let frame = frames.borrow_and_update();
                        (frame.generation, frame.text.clone())
                    };
                    if r#gen != generation {
                        generation = r#gen;
                        inserted_len = 0;
                    }
                    // Cumulative text never shrinks within a generation, so
                    // the already-inserted prefix is stable and this slice is
                    // exactly the unseen suffix.
                    let diff = &text[inserted_len..];
                    if !diff.is_empty() {
                        trace!(generation, bytes = diff.len(), "inserting completion diff");
                        engine.insert_content(diff);
                    }
                    inserted_len = text.len();
                }
            }
        }
    })
}

// ============================================================================
// Tests
// ============================================================================
