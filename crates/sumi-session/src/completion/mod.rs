//! AI completion streaming.
//!
//! The session never talks to a model endpoint directly. It observes a
//! [`CompletionSource`]: a watch channel of cumulative text plus a loading
//! flag. The shipped [`CompletionDriver`] implements the source over watch
//! channels and hands the transport side (the actual HTTP/SSE pump, owned by
//! the host) an mpsc of [`CompletionRequest`]s along with `append`, `finish`
//! and `fail` entry points.
//!
//! ```text
//!  complete(prompt) ──► CompletionRequest ──► transport (host-owned)
//!                                                │ append(gen, delta)
//!  watch_text() ◄── CompletionFrame { gen, text }┘
//!       │
//!       ▼
//!  stream bridge ── insert_content(diff) ──► document engine
//! ```
//!
//! Each `complete()` call starts a new *generation* with empty cumulative
//! text. Within a generation the text only grows; deltas arriving for an old
//! or stopped generation are discarded, which is what makes `stop()`
//! synchronous and immediate.

mod bridge;
mod driver;

pub(crate) use bridge::spawn_stream_bridge;
pub use driver::CompletionDriver;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::CompletionError;

/// One observation of the cumulative completion text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionFrame {
    /// Increments on each `complete()` call.
    pub generation: u64,
    /// Cumulative text so far. Only grows within a generation.
    pub text: String,
}

/// A dispatched completion request, consumed by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub generation: u64,
    pub prompt: String,
    /// The configured `completion_api` endpoint.
    pub endpoint: String,
}

/// An observable, stoppable completion stream.
#[async_trait]
pub trait CompletionSource: Send + Sync {
    /// Start (or restart) a completion seeded with `prompt`.
    async fn complete(&self, prompt: &str) -> Result<(), CompletionError>;

    /// Stop the in-flight completion. Idempotent.
    fn stop(&self);

    /// Cumulative text, coalesced. Pair with the diff rule in the stream
    /// bridge to recover every byte.
    fn watch_text(&self) -> watch::Receiver<CompletionFrame>;

    /// True from `complete()` until finish, failure or stop.
    fn watch_loading(&self) -> watch::Receiver<bool>;
}
