//! Error types for record stores

use crate::status::TransitionError;

/// Record store failure
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// SQLite reported an error
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Update targeted a uid with no record
    #[error("record `{0}` not found")]
    NotFound(String),

    /// Insert with a uid that already exists
    #[error("record `{0}` already exists")]
    Duplicate(String),

    /// Status change not permitted by the lifecycle
    #[error("record `{uid}`: {source}")]
    IllegalTransition {
        /// Record being updated
        uid: String,
        /// Rejected transition
        #[source]
        source: TransitionError,
    },

    /// Injected or backend-specific failure
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Illegal transition for `uid`
    pub fn illegal_transition(uid: impl Into<String>, source: TransitionError) -> Self {
        Self::IllegalTransition {
            uid: uid.into(),
            source,
        }
    }
}
