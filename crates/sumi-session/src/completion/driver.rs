//! Watch-channel completion source with a pluggable transport.

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tracing::{debug, trace, warn};

use async_trait::async_trait;

use super::{CompletionFrame, CompletionRequest, CompletionSource};
use crate::error::CompletionError;

struct DriverState {
    generation: u64,
    /// Set by `stop()`; cleared by the next `complete()`.
    stopped: bool,
}

/// The shipped [`CompletionSource`].
///
/// `complete()` dispatches a [`CompletionRequest`] to the transport taken via
/// [`CompletionDriver::requests`]; the transport feeds tokens back through
/// [`append`](CompletionDriver::append) and closes the run with
/// [`finish`](CompletionDriver::finish) or [`fail`](CompletionDriver::fail).
/// All feedback is generation-checked, so a stopped or superseded run cannot
/// touch the observable text.
pub struct CompletionDriver {
    endpoint: String,
    state: Mutex<DriverState>,
    text_tx: watch::Sender<CompletionFrame>,
    loading_tx: watch::Sender<bool>,
    request_tx: mpsc::UnboundedSender<CompletionRequest>,
    request_rx: Mutex<Option<mpsc::UnboundedReceiver<CompletionRequest>>>,
}

impl CompletionDriver {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (text_tx, _) = watch::channel(CompletionFrame::default());
        let (loading_tx, _) = watch::channel(false);
        Self {
            endpoint: endpoint.into(),
            state: Mutex::new(DriverState {
                generation: 0,
                stopped: false,
            }),
            text_tx,
            loading_tx,
            request_tx,
            request_rx: Mutex::new(Some(request_rx)),
        }
    }

    /// Take the transport end. Requests dispatched by `complete()` arrive
    /// here in order.
    ///
    /// # Panics
    ///
    /// Panics if called twice; there is exactly one transport.
    pub fn requests(&self) -> mpsc::UnboundedReceiver<CompletionRequest> {
        self.request_rx
            .lock()
            .take()
            .expect("completion request receiver already taken")
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    pub fn is_loading(&self) -> bool {
        *self.loading_tx.borrow()
    }

    /// Start a new generation and dispatch its request.
    pub async fn complete(&self, prompt: &str) -> Result<(), CompletionError> {
        let request = {
            let mut state = self.state.lock();
            state.generation += 1;
            state.stopped = false;
            // Reset the observable text before the transport can see the
            // request, so appends never land on a stale frame.
            self.text_tx.send_replace(CompletionFrame {
                generation: state.generation,
                text: String::new(),
            });
            CompletionRequest {
                generation: state.generation,
                prompt: prompt.to_owned(),
                endpoint: self.endpoint.clone(),
            }
        };

        debug!(generation = request.generation, "dispatching completion request");
        if self.request_tx.send(request).is_err() {
            self.loading_tx.send_replace(false);
            return Err(CompletionError::Detached);
        }
        self.loading_tx.send_replace(true);
        Ok(())
    }

    /// Stop the current generation. Later appends for it are discarded.
    pub fn stop(&self) {
        {
            let mut state = self.state.lock();
            if state.stopped {
                return;
            }
            state.stopped = true;
        }
        debug!("completion stopped");
        self.loading_tx.send_replace(false);
    }

    /// Append a delta to `generation`'s cumulative text. Stale and stopped
    /// generations are discarded.
    pub fn append(&self, generation: u64, delta: &str) {
        let state = self.state.lock();
        if generation != state.generation || state.stopped {
            trace!(generation, "discarding stale completion delta");
            return;
        }
        self.text_tx.send_modify(|frame| {
            frame.generation = generation;
            frame.text.push_str(delta);
        });
    }

    /// Mark `generation` complete, dropping the loading flag.
    pub fn finish(&self, generation: u64) {
        let state = self.state.lock();
        if generation != state.generation || state.stopped {
            return;
        }
        debug!(generation, "completion finished");
        self.loading_tx.send_replace(false);
    }

    /// Record a transport failure for `generation` and drop the loading flag.
    pub fn fail(&self, generation: u64, reason: &str) {
        let state = self.state.lock();
        if generation != state.generation || state.stopped {
            return;
        }
        warn!(generation, reason, "completion request failed");
        self.loading_tx.send_replace(false);
    }
}

#[async_trait]
impl CompletionSource for CompletionDriver {
    async fn complete(&self, prompt: &str) -> Result<(), CompletionError> {
        CompletionDriver::complete(self, prompt).await
    }

    fn stop(&self) {
        CompletionDriver::stop(self);
    }

    fn watch_text(&self) -> watch::Receiver<CompletionFrame> {
        self.text_tx.subscribe()
    }

    fn watch_loading(&self) -> watch::Receiver<bool> {
        self.loading_tx.subscribe()
    }
}

impl std::fmt::Debug for CompletionDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CompletionDriver")
            .field("endpoint", &self.endpoint)
            .field("generation", &state.generation)
            .field("stopped", &state.stopped)
            .field("loading", &self.is_loading())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
