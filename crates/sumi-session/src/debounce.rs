//! Trailing-edge debounce for snapshot writes.
//!
//! One pending slot, one logical timer. Every [`Debouncer::record`] call
//! replaces the slot and restarts the window, so a burst of edits produces
//! exactly one flush, carrying the content of the *last* call in the burst.
//! The flush handler runs on a spawned task once the window elapses with no
//! further calls.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use parking_lot::Mutex;
use sumi_types::Content;
use tokio::task::JoinHandle;
use tracing::trace;

type FlushHandler = Arc<dyn Fn(Content) -> BoxFuture<'static, ()> + Send + Sync>;

struct DebounceState {
    pending: Option<Content>,
    /// Bumped on every record/cancel/flush. A timer that wakes to find a
    /// newer generation was superseded and must not flush.
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

/// Single-slot trailing-edge debouncer.
pub struct Debouncer {
    window: Duration,
    state: Arc<Mutex<DebounceState>>,
    /// Serializes handler runs so flushes cannot overlap or reorder.
    gate: Arc<tokio::sync::Mutex<()>>,
    on_flush: FlushHandler,
}

impl Debouncer {
    pub fn new<F, Fut>(window: Duration, on_flush: F) -> Self
    where
        F: Fn(Content) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            window,
            state: Arc::new(Mutex::new(DebounceState {
                pending: None,
                generation: 0,
                timer: None,
            })),
            gate: Arc::new(tokio::sync::Mutex::new(())),
            on_flush: Arc::new(move |content| Box::pin(on_flush(content))),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Whether a flush is pending.
    pub fn is_armed(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    /// Replace the pending content and restart the window.
    ///
    /// Must be called from within a tokio runtime.
    pub fn record(&self, content: Content) {
        let mut state = self.state.lock();
        state.generation += 1;
        let generation = state.generation;
        state.pending = Some(content);
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }

        let shared = Arc::clone(&self.state);
        let gate = Arc::clone(&self.gate);
        let handler = Arc::clone(&self.on_flush);
        let window = self.window;
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let _serialized = gate.lock().await;
            let content = {
                let mut state = shared.lock();
                if state.generation != generation {
                    return;
                }
                state.timer = None;
                state.pending.take()
            };
            if let Some(content) = content {
                trace!("debounce window elapsed, flushing");
                handler(content).await;
            }
        }));
    }

    /// Disarm without flushing. Pending content is dropped.
    pub fn cancel(&self) {
        let mut state = self.state.lock();
        state.generation += 1;
        state.pending = None;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
    }

    /// Disarm and hand back the pending content, if any, without running
    /// the flush handler. For callers that want to write immediately and
    /// observe the result themselves.
    pub fn take_pending(&self) -> Option<Content> {
        let mut state = self.state.lock();
        state.generation += 1;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.pending.take()
    }

    /// Flush immediately if armed, running the handler before returning.
    pub async fn flush(&self) {
        if let Some(content) = self.take_pending() {
            let _serialized = self.gate.lock().await;
            (self.on_flush)(content).await;
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        // A timer that outlives the debouncer must not fire its flush.
        let mut state = self.state.lock();
        state.generation += 1;
        state.pending = None;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
    }
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("window", &self.window)
            .field("armed", &self.is_armed())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, Instant};

    /// Flush log: (content, virtual elapsed ms since `start`).
    type FlushLog = Arc<Mutex<Vec<(String, u64)>>>;

    fn logging_debouncer(window_ms: u64, start: Instant) -> (Debouncer, FlushLog) {
        let log: FlushLog = Arc::new(Mutex::new(Vec::new()));
        let log_clone = Arc::clone(&log);
        let debouncer = Debouncer::new(Duration::from_millis(window_ms), move |content: Content| {
            let log = Arc::clone(&log_clone);
            async move {
                let at = Instant::now().duration_since(start).as_millis() as u64;
                log.lock().push((content.plain_text(), at));
            }
        });
        (debouncer, log)
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces_to_one_flush_with_last_content() {
        let start = Instant::now();
        let (debouncer, log) = logging_debouncer(100, start);

        debouncer.record(Content::from("a"));
        advance(Duration::from_millis(50)).await;
        debouncer.record(Content::from("ab"));
        advance(Duration::from_millis(100)).await;
        settle().await;

        let flushes = log.lock().clone();
        assert_eq!(flushes, vec![("ab".to_string(), 150)]);
        assert!(!debouncer.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_flush_before_window_elapses() {
        let start = Instant::now();
        let (debouncer, log) = logging_debouncer(100, start);

        debouncer.record(Content::from("a"));
        advance(Duration::from_millis(99)).await;
        settle().await;

        assert!(log.lock().is_empty());
        assert!(debouncer.is_armed());

        advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(log.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_quiet_period_flushes_once() {
        let start = Instant::now();
        let (debouncer, log) = logging_debouncer(100, start);

        debouncer.record(Content::from("first"));
        advance(Duration::from_millis(100)).await;
        settle().await;

        debouncer.record(Content::from("second"));
        advance(Duration::from_millis(100)).await;
        settle().await;

        let flushes = log.lock().clone();
        assert_eq!(
            flushes,
            vec![("first".to_string(), 100), ("second".to_string(), 200)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_without_flush() {
        let start = Instant::now();
        let (debouncer, log) = logging_debouncer(100, start);

        debouncer.record(Content::from("doomed"));
        debouncer.cancel();
        assert!(!debouncer.is_armed());

        advance(Duration::from_millis(500)).await;
        settle().await;
        assert!(log.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_runs_immediately_and_disarms() {
        let start = Instant::now();
        let (debouncer, log) = logging_debouncer(100, start);

        debouncer.record(Content::from("now"));
        debouncer.flush().await;

        assert_eq!(log.lock().clone(), vec![("now".to_string(), 0)]);
        assert!(!debouncer.is_armed());

        // The aborted timer must not produce a second flush
        advance(Duration::from_millis(500)).await;
        settle().await;
        assert_eq!(log.lock().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_when_idle_is_noop() {
        let start = Instant::now();
        let (debouncer, log) = logging_debouncer(100, start);
        debouncer.flush().await;
        assert!(log.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_take_pending_disarms_without_handler() {
        let start = Instant::now();
        let (debouncer, log) = logging_debouncer(100, start);

        debouncer.record(Content::from("mine"));
        let taken = debouncer.take_pending();
        assert_eq!(taken, Some(Content::from("mine")));
        assert!(!debouncer.is_armed());

        advance(Duration::from_millis(500)).await;
        settle().await;
        assert!(log.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_records_keep_deferring() {
        let start = Instant::now();
        let (debouncer, log) = logging_debouncer(100, start);

        for i in 0..5 {
            debouncer.record(Content::from(format!("v{i}")));
            advance(Duration::from_millis(60)).await;
        }
        // Last record at t=240; window ends at t=340
        advance(Duration::from_millis(40)).await;
        settle().await;

        let flushes = log.lock().clone();
        assert_eq!(flushes, vec![("v4".to_string(), 340)]);
    }
}
