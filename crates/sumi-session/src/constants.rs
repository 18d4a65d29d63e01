//! Session configuration constants.
//!
//! Centralizes the defaults the options normalizer falls back to, so hosts
//! and tests reference one set of values.

use std::time::Duration;

/// Default completion endpoint carried in completion requests.
pub const DEFAULT_COMPLETION_API: &str = "/api/generate";

/// Default storage key when neither `storage_key` nor a session id is given.
pub const DEFAULT_STORAGE_KEY: &str = "sumi__content";

/// Default trailing-edge debounce window for snapshot writes.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(750);

/// Default container class passed through to the host's outer element.
pub const DEFAULT_CONTAINER_CLASS: &str =
    "sumi-relative sumi-min-h-[500px] sumi-w-full sumi-max-w-screen-lg sumi-border sumi-bg-white sumi-p-12 sumi-px-8 sumi-shadow-lg sumi-rounded-lg";

/// Default placeholder prompt shown in an empty document.
pub const DEFAULT_PLACEHOLDER_TEXT: &str = "Press '/' for commands, or '++' for AI autocomplete...";

/// Sentinel inserted after an interrupted completion; typing it again asks
/// the AI to continue from where it stopped.
pub const CONTINUATION_SENTINEL: &str = "++";
