//! Shared content, event, and identifier types for Sumi.
//!
//! This crate is the vocabulary the session controller and its collaborators
//! speak: document snapshots, change events, selections, slash-command
//! descriptors, and session identifiers. It has **no internal sumi
//! dependencies** — a pure leaf crate that other crates build on.
//!
//! # Data Flow Overview
//!
//! ```text
//! DocumentEngine (host editor library)
//!     └── emits ChangeEvent { Content, Transaction }
//!             └── Content: Text | Tree (opaque snapshot)
//!             └── Transaction: EditOrigin + char counts
//!     └── reports Selection { from, to } (char positions)
//!
//! Session (SessionId)
//!     └── persists Content under a storage key
//!     └── merges SlashCommand lists into engine config
//! ```
//!
//! # Key Types
//!
//! |------------------|---------------------------------------------|
//! | Type             | Purpose                                     |
//! |------------------|---------------------------------------------|
//! | [`Content`]      | Opaque document snapshot (text or tree)     |
//! | [`ChangeEvent`]  | One engine edit notification                |
//! | [`Transaction`]  | Edit summary (origin + char counts)         |
//! | [`Selection`]    | Cursor/selection bounds in chars            |
//! | [`SlashCommand`] | Slash-menu entry descriptor (data only)     |
//! | [`SessionId`]    | Which editor session                        |
//! |------------------|---------------------------------------------|

pub mod command;
pub mod content;
pub mod event;
pub mod ids;

// Re-export primary types at crate root for convenience.
pub use command::SlashCommand;
pub use content::Content;
pub use event::{ChangeEvent, EditOrigin, Selection, Transaction};
pub use ids::SessionId;
