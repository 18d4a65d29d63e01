//! User interruption of an in-flight completion.
//!
//! While the completion stream is loading, the host forwards three gestures
//! here instead of handling them itself. The gesture gate mirrors the loading
//! flag (toggled by the session's loading supervisor) so that gestures
//! arriving outside a stream fall through to the host untouched.
//!
//! | Gesture       | Effect                                                  |
//! |---------------|---------------------------------------------------------|
//! | `Escape`      | stop, delete the inserted completion text, leave `"++"` |
//! | `Undo`        | stop, keep the inserted text, leave `"++"`              |
//! | `PointerDown` | stop, then ask whether to resume from the document      |

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::completion::{CompletionFrame, CompletionSource};
use crate::constants::CONTINUATION_SENTINEL;
use crate::engine::DocumentEngine;

/// A gesture the host captured while a completion was streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptGesture {
    /// Escape key.
    Escape,
    /// The platform undo chord (Cmd+Z / Ctrl+Z).
    Undo,
    /// Pointer-down anywhere in the document.
    PointerDown,
}

/// What a dispatched gesture did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptOutcome {
    /// The gate was inactive; the host should run its default handling.
    Inactive,
    /// The stream was stopped. `rolled_back` is true when the inserted
    /// completion text was deleted from the document.
    Stopped { rolled_back: bool },
    /// The stream was stopped and restarted from the document's text.
    Resumed,
    /// The stream was stopped and the user declined to resume (or the
    /// restart failed).
    Paused,
}

/// Armed exactly while a completion is streaming.
#[derive(Debug, Default)]
pub struct GestureGate {
    active: AtomicBool,
}

impl GestureGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn activate(&self) {
        if !self.active.swap(true, Ordering::AcqRel) {
            debug!("gesture gate armed");
        }
    }

    pub fn deactivate(&self) {
        if self.active.swap(false, Ordering::AcqRel) {
            debug!("gesture gate disarmed");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Host-side confirmation dialog for resuming after a pointer-down.
#[async_trait]
pub trait ResumePrompt: Send + Sync {
    async fn confirm_resume(&self) -> bool;
}

#[async_trait]
impl<F> ResumePrompt for F
where
    F: Fn() -> bool + Send + Sync,
{
    async fn confirm_resume(&self) -> bool {
        (self)()
    }
}

pub struct InterruptController {
    engine: Arc<dyn DocumentEngine>,
    completion: Arc<dyn CompletionSource>,
    prompt: Arc<dyn ResumePrompt>,
    gate: Arc<GestureGate>,
    frames: watch::Receiver<CompletionFrame>,
}

impl InterruptController {
    pub fn new(
        engine: Arc<dyn DocumentEngine>,
        completion: Arc<dyn CompletionSource>,
        prompt: Arc<dyn ResumePrompt>,
        gate: Arc<GestureGate>,
    ) -> Self {
        let frames = completion.watch_text();
        Self {
            engine,
            completion,
            prompt,
            gate,
            frames,
        }
    }

    pub fn gate(&self) -> &Arc<GestureGate> {
        &self.gate
    }

    pub async fn dispatch(&self, gesture: InterruptGesture) -> InterruptOutcome {
        if !self.gate.is_active() {
            return InterruptOutcome::Inactive;
        }
        debug!(?gesture, "interrupting completion");
        match gesture {
            InterruptGesture::Escape => {
                self.completion.stop();
                let completion_chars = self.frames.borrow().text.chars().count();
                let caret = self.engine.selection().from;
                self.engine
                    .delete_range(caret.saturating_sub(completion_chars), caret);
                self.engine.insert_content(CONTINUATION_SENTINEL);
                InterruptOutcome::Stopped { rolled_back: true }
            }
            InterruptGesture::Undo => {
                self.completion.stop();
                self.engine.insert_content(CONTINUATION_SENTINEL);
                InterruptOutcome::Stopped { rolled_back: false }
            }
            InterruptGesture::PointerDown => {
                self.completion.stop();
                if !self.prompt.confirm_resume().await {
                    return InterruptOutcome::Paused;
                }
                let prompt_text = self.engine.plain_text();
                match self.completion.complete(&prompt_text).await {
                    Ok(()) => InterruptOutcome::Resumed,
                    Err(err) => {
                        warn!(error = %err, "completion restart failed");
                        InterruptOutcome::Paused
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for InterruptController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterruptController")
            .field("gate_active", &self.gate.is_active())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
