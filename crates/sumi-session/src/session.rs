//! Session orchestration.
//!
//! A [`Session`] wires the collaborators together and supervises three tasks
//! until [`Session::close`] or drop:
//!
//! ```text
//!  engine changes ──► update loop ──► interceptors ──► on_update
//!                                          │
//!                                          ▼
//!                                     debouncer ──► snapshot write
//!
//!  completion text ──► stream bridge ──► engine.insert_content(diff)
//!  completion loading ──► loading supervisor ──► gesture gate
//! ```
//!
//! All three tasks share one `CancellationToken`. Lifecycle milestones are
//! broadcast as [`SessionEvent`]s; failures never abort the session.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use sumi_types::Content;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::completion::{CompletionDriver, CompletionSource, spawn_stream_bridge};
use crate::debounce::Debouncer;
use crate::engine::{DocumentEngine, PlainTextEngine};
use crate::error::{CompletionError, PersistenceError};
use crate::hydrate::Hydrator;
use crate::interrupt::{
    GestureGate, InterruptController, InterruptGesture, InterruptOutcome, ResumePrompt,
};
use crate::options::{DebouncedCallback, EditorOptions, SessionOptions};
use crate::store::{MemoryStore, SnapshotStore};

const EVENT_CAPACITY: usize = 1024;

/// Session lifecycle notifications, observable via [`Session::subscribe`].
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Initial content landed in the engine.
    Hydrated,
    /// A debounced (or explicit) snapshot write succeeded.
    SnapshotSaved { key: String },
    /// A snapshot write failed; the session keeps running.
    SaveFailed { key: String, reason: String },
    /// `close()` finished tearing the session down.
    Closed,
}

/// Shared write path for debounced flushes and explicit `flush()` calls:
/// debounced callback first, then the store write when persistence is on.
struct SnapshotWriter {
    store: Arc<dyn SnapshotStore>,
    storage_key: String,
    persistence_disabled: bool,
    on_debounced_update: DebouncedCallback,
    events: broadcast::Sender<SessionEvent>,
}

impl SnapshotWriter {
    async fn persist(&self, content: Content) -> Result<(), PersistenceError> {
        (self.on_debounced_update)(&content);
        if self.persistence_disabled {
            return Ok(());
        }
        match self.store.set(&self.storage_key, &content).await {
            Ok(()) => {
                debug!(key = %self.storage_key, "snapshot saved");
                let _ = self.events.send(SessionEvent::SnapshotSaved {
                    key: self.storage_key.clone(),
                });
                Ok(())
            }
            Err(err) => {
                warn!(key = %self.storage_key, error = %err, "snapshot write failed");
                let _ = self.events.send(SessionEvent::SaveFailed {
                    key: self.storage_key.clone(),
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }
}

/// Assembles a [`Session`] from options plus optional collaborator overrides.
///
/// Unset collaborators get the shipped defaults: [`PlainTextEngine`],
/// [`MemoryStore`], a [`CompletionDriver`] on the resolved endpoint, and a
/// resume prompt that always declines.
pub struct SessionBuilder {
    options: EditorOptions,
    engine: Option<Arc<dyn DocumentEngine>>,
    store: Option<Arc<dyn SnapshotStore>>,
    completion: Option<Arc<dyn CompletionSource>>,
    resume_prompt: Option<Arc<dyn ResumePrompt>>,
}

impl SessionBuilder {
    pub fn new(options: EditorOptions) -> Self {
        Self {
            options,
            engine: None,
            store: None,
            completion: None,
            resume_prompt: None,
        }
    }

    pub fn with_engine(mut self, engine: Arc<dyn DocumentEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_completion(mut self, completion: Arc<dyn CompletionSource>) -> Self {
        self.completion = Some(completion);
        self
    }

    pub fn with_resume_prompt(mut self, prompt: Arc<dyn ResumePrompt>) -> Self {
        self.resume_prompt = Some(prompt);
        self
    }

    /// Resolve options, attempt initial hydration, and start the session
    /// tasks. Hydration failures are logged and left retriable; they do not
    /// fail the spawn.
    pub async fn spawn(self) -> Session {
        let options = self.options.resolve();
        let engine = self
            .engine
            .unwrap_or_else(|| Arc::new(PlainTextEngine::new()));
        let store = self.store.unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let completion = self
            .completion
            .unwrap_or_else(|| Arc::new(CompletionDriver::new(options.completion_api.clone())));
        let resume_prompt: Arc<dyn ResumePrompt> =
            self.resume_prompt.unwrap_or_else(|| Arc::new(|| false));

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let cancel = CancellationToken::new();
        let gate = Arc::new(GestureGate::new());

        let writer = Arc::new(SnapshotWriter {
            store: Arc::clone(&store),
            storage_key: options.storage_key.clone(),
            persistence_disabled: options.disable_persistence,
            on_debounced_update: Arc::clone(&options.on_debounced_update),
            events: events.clone(),
        });
        let debouncer = Arc::new(Debouncer::new(options.debounce_duration, {
            let writer = Arc::clone(&writer);
            move |content| {
                let writer = Arc::clone(&writer);
                async move {
                    let _ = writer.persist(content).await;
                }
            }
        }));

        let hydrator = Hydrator::new(
            Arc::clone(&engine),
            Arc::clone(&store),
            options.storage_key.clone(),
            options.default_value.clone(),
            options.disable_persistence,
        );
        let interrupts = InterruptController::new(
            Arc::clone(&engine),
            Arc::clone(&completion),
            resume_prompt,
            Arc::clone(&gate),
        );

        let update_loop = spawn_update_loop(
            engine.subscribe_changes(),
            &options,
            Arc::clone(&debouncer),
            cancel.clone(),
        );
        let bridge = spawn_stream_bridge(
            Arc::clone(&engine),
            completion.watch_text(),
            cancel.clone(),
        );
        let supervisor =
            spawn_loading_supervisor(completion.watch_loading(), Arc::clone(&gate), cancel.clone());

        let session = Session {
            options,
            engine,
            store,
            completion,
            hydrator,
            debouncer,
            writer,
            interrupts,
            gate,
            events,
            cancel,
            tasks: Mutex::new(vec![update_loop, bridge, supervisor]),
            closed: AtomicBool::new(false),
        };

        match session.try_hydrate().await {
            Ok(true) => {}
            Ok(false) => debug!("no content source yet, session stays uninitialized"),
            Err(err) => warn!(error = %err, "initial hydration failed"),
        }
        info!(key = %session.options.storage_key, "session started");
        session
    }
}

fn spawn_update_loop(
    mut changes: broadcast::Receiver<sumi_types::ChangeEvent>,
    options: &SessionOptions,
    debouncer: Arc<Debouncer>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let interceptors = options.interceptors.clone();
    let on_update = Arc::clone(&options.on_update);
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = changes.recv() => match event {
                    Ok(event) => {
                        if interceptors.suppresses(&event) {
                            trace!("change suppressed by interceptor");
                            continue;
                        }
                        (on_update)(&event);
                        debouncer.record(event.document);
                    }
                    Err(RecvError::Lagged(missed)) => {
                        warn!(missed, "change stream lagged, skipping");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
    })
}

fn spawn_loading_supervisor(
    mut loading: tokio::sync::watch::Receiver<bool>,
    gate: Arc<GestureGate>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                changed = loading.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    if *loading.borrow_and_update() {
                        gate.activate();
                    } else {
                        gate.deactivate();
                    }
                }
            }
        }
        // Teardown must leave no gesture capture behind
        gate.deactivate();
    })
}

/// One live editor session.
pub struct Session {
    options: SessionOptions,
    engine: Arc<dyn DocumentEngine>,
    store: Arc<dyn SnapshotStore>,
    completion: Arc<dyn CompletionSource>,
    hydrator: Hydrator,
    debouncer: Arc<Debouncer>,
    writer: Arc<SnapshotWriter>,
    interrupts: InterruptController,
    gate: Arc<GestureGate>,
    events: broadcast::Sender<SessionEvent>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl Session {
    pub fn builder(options: EditorOptions) -> SessionBuilder {
        SessionBuilder::new(options)
    }

    /// Spawn with default collaborators.
    pub async fn spawn(options: EditorOptions) -> Self {
        SessionBuilder::new(options).spawn().await
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn engine(&self) -> &Arc<dyn DocumentEngine> {
        &self.engine
    }

    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    pub fn completion(&self) -> &Arc<dyn CompletionSource> {
        &self.completion
    }

    /// Lifecycle notifications from this point on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrator.is_hydrated()
    }

    /// Attempt hydration (see [`crate::hydrate::Hydrator::try_hydrate`]).
    /// Broadcasts [`SessionEvent::Hydrated`] on the first success.
    pub async fn try_hydrate(&self) -> Result<bool, PersistenceError> {
        let before = self.hydrator.is_hydrated();
        let hydrated = self.hydrator.try_hydrate().await?;
        if hydrated && !before {
            let _ = self.events.send(SessionEvent::Hydrated);
        }
        Ok(hydrated)
    }

    /// Start (or restart) an AI completion seeded with `prompt`.
    pub async fn complete(&self, prompt: &str) -> Result<(), CompletionError> {
        self.completion.complete(prompt).await
    }

    /// Forward a captured gesture to the cancellation handler.
    pub async fn dispatch_interrupt(&self, gesture: InterruptGesture) -> InterruptOutcome {
        self.interrupts.dispatch(gesture).await
    }

    /// Whether interrupt gestures are currently captured.
    pub fn gate_active(&self) -> bool {
        self.gate.is_active()
    }

    /// Write any pending debounced snapshot immediately.
    ///
    /// `close()` drops pending content on the floor; hosts that cannot
    /// afford to lose the tail of a debounce window call this first.
    pub async fn flush(&self) -> Result<(), PersistenceError> {
        if let Some(content) = self.debouncer.take_pending() {
            self.writer.persist(content).await?;
        }
        Ok(())
    }

    /// Tear the session down: cancel the pending debounce without flushing,
    /// stop any in-flight completion, release the gesture gate, and await
    /// task shutdown. Idempotent.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        debug!(key = %self.options.storage_key, "closing session");
        self.cancel.cancel();
        self.completion.stop();
        let handles: Vec<JoinHandle<()>> = self.tasks.lock().drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
        // After the update loop has stopped, nothing can re-arm this
        self.debouncer.cancel();
        self.gate.deactivate();
        let _ = self.events.send(SessionEvent::Closed);
        info!(key = %self.options.storage_key, "session closed");
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::Acquire) {
            self.cancel.cancel();
            self.debouncer.cancel();
            self.gate.deactivate();
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("storage_key", &self.options.storage_key)
            .field("hydrated", &self.is_hydrated())
            .field("gate_active", &self.gate.is_active())
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreResult;
    use async_trait::async_trait;

    struct RejectingStore;

    #[async_trait]
    impl SnapshotStore for RejectingStore {
        async fn get(&self, _key: &str) -> StoreResult<Option<Content>> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _content: &Content) -> StoreResult<()> {
            Err(PersistenceError::Backend("disk full".into()))
        }
    }

    fn writer(
        store: Arc<dyn SnapshotStore>,
        disabled: bool,
        on_debounced: DebouncedCallback,
    ) -> (SnapshotWriter, broadcast::Receiver<SessionEvent>) {
        let (events, rx) = broadcast::channel(16);
        (
            SnapshotWriter {
                store,
                storage_key: "notes".into(),
                persistence_disabled: disabled,
                on_debounced_update: on_debounced,
                events,
            },
            rx,
        )
    }

    #[tokio::test]
    async fn test_writer_persists_and_broadcasts_saved() {
        let store = Arc::new(MemoryStore::new());
        let (writer, mut events) = writer(store.clone(), false, Arc::new(|_| {}));

        writer.persist(Content::from("draft")).await.unwrap();

        assert_eq!(store.get("notes").await.unwrap(), Some(Content::from("draft")));
        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::SnapshotSaved { key } if key == "notes"
        ));
    }

    #[tokio::test]
    async fn test_writer_failure_broadcasts_save_failed() {
        let (writer, mut events) = writer(Arc::new(RejectingStore), false, Arc::new(|_| {}));

        let err = writer.persist(Content::from("draft")).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Backend(_)));
        assert!(matches!(
            events.recv().await.unwrap(),
            SessionEvent::SaveFailed { reason, .. } if reason.contains("disk full")
        ));
    }

    #[tokio::test]
    async fn test_writer_disabled_skips_store_but_fires_callback() {
        let fired = Arc::new(AtomicBool::new(false));
        let fired_clone = Arc::clone(&fired);
        let store = Arc::new(MemoryStore::new());
        let (writer, mut events) = writer(
            store.clone(),
            true,
            Arc::new(move |_| fired_clone.store(true, Ordering::Release)),
        );

        writer.persist(Content::from("draft")).await.unwrap();

        assert!(fired.load(Ordering::Acquire));
        assert!(store.is_empty());
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_spawn_with_empty_sources_stays_uninitialized() {
        let session = Session::spawn(EditorOptions::new()).await;
        assert!(!session.is_hydrated());
        assert_eq!(session.options().storage_key, "sumi__content");
        session.close().await;
    }

    #[tokio::test]
    async fn test_close_is_idempotent_and_broadcasts() {
        let session = Session::spawn(EditorOptions::new()).await;
        let mut events = session.subscribe();
        session.close().await;
        session.close().await;
        assert!(matches!(events.recv().await.unwrap(), SessionEvent::Closed));
        assert!(matches!(
            events.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
