//! # sumi-session
//!
//! Embeddable rich-text editor session controller.
//!
//! A [`Session`] sits between a host UI and three collaborators it does not
//! implement itself: a document engine, a key-value snapshot store, and an AI
//! completion stream. It owns the glue the host would otherwise hand-roll:
//!
//! - one-shot **hydration** of initial content (persisted snapshot or
//!   configured default), bypassing the update path
//! - **debounced snapshot persistence** of every document change, with an
//!   interceptor chain that can suppress individual changes
//! - a **stream bridge** that turns the completion stream's cumulative text
//!   into incremental document insertions
//! - a **cancellation handler** for user gestures (Escape, undo chord,
//!   pointer-down) while a completion is streaming
//!
//! ```no_run
//! use sumi_session::{DocumentEngine, EditorOptions, Session};
//!
//! # async fn demo() {
//! let session = Session::spawn(
//!     EditorOptions::new()
//!         .with_storage_key("scratch")
//!         .with_default_value("# Notes\n"),
//! )
//! .await;
//!
//! session.engine().insert_content("hello");
//! session.flush().await.unwrap();
//! session.close().await;
//! # }
//! ```

pub mod completion;
pub mod constants;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod hydrate;
pub mod intercept;
pub mod interrupt;
pub mod options;
pub mod session;
pub mod store;

pub use completion::{CompletionDriver, CompletionFrame, CompletionRequest, CompletionSource};
pub use debounce::Debouncer;
pub use engine::{DocumentEngine, PlainTextEngine};
pub use error::{CompletionError, PersistenceError, SessionError};
pub use hydrate::Hydrator;
pub use intercept::{InterceptorChain, UpdateInterceptor};
pub use interrupt::{
    GestureGate, InterruptController, InterruptGesture, InterruptOutcome, ResumePrompt,
};
pub use options::{
    DebouncedCallback, EditorOptions, EngineProps, Extension, SessionOptions, UpdateCallback,
};
pub use session::{Session, SessionBuilder, SessionEvent};
pub use store::{MemoryStore, SnapshotStore, SqliteStore, StoreResult};

// Re-export the shared types so hosts only need one dependency.
pub use sumi_types::{
    ChangeEvent, Content, EditOrigin, Selection, SessionId, SlashCommand, Transaction,
};
