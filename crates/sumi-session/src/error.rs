//! Error types for session operations.

use thiserror::Error;

/// Errors from snapshot stores.
///
/// Persistence failures never abort a session: hydration returns them to the
/// caller, debounced writes log them and broadcast a session event.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Store capacity would be exceeded by this write.
    #[error("storage quota exceeded: {needed} bytes needed, {capacity} available")]
    QuotaExceeded { needed: usize, capacity: usize },

    /// SQLite-level failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Snapshot encode/decode failure.
    #[error("snapshot codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Backend-specific failure from a host-provided store.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Errors from starting or restarting a completion run.
///
/// Mid-stream transport failures are not errors here — the completion source
/// reports them by flipping its loading flag off.
#[derive(Error, Debug, Clone)]
pub enum CompletionError {
    /// No transport is consuming completion requests.
    #[error("completion source detached: no transport is consuming requests")]
    Detached,

    /// The transport rejected the request.
    #[error("completion request rejected: {0}")]
    Rejected(String),
}

/// Umbrella error for session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Completion(#[from] CompletionError),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_message_names_sizes() {
        let err = PersistenceError::QuotaExceeded {
            needed: 2048,
            capacity: 1024,
        };
        let msg = err.to_string();
        assert!(msg.contains("2048"));
        assert!(msg.contains("1024"));
    }

    #[test]
    fn test_session_error_from_persistence() {
        let err: SessionError = PersistenceError::Backend("boom".into()).into();
        assert!(matches!(err, SessionError::Persistence(_)));
        assert_eq!(err.to_string(), "store backend error: boom");
    }

    #[test]
    fn test_session_error_from_completion() {
        let err: SessionError = CompletionError::Detached.into();
        assert!(matches!(err, SessionError::Completion(_)));
    }
}
