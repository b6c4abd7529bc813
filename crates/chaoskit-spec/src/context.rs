//! Request-scoped execution context
//!
//! The context is an immutable value threaded through every executor and
//! channel call. Builders return a new context, the receiver is never mutated.

/// Identifier used when a destroy runs without a stored record
pub const UNKNOWN_UID: &str = "unknown";

/// Per-request execution context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpContext {
    uid: Option<String>,
    destroy_uid: Option<String>,
}

impl ExpContext {
    /// Empty context: create mode, no identifier
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of this context carrying `uid`
    #[must_use]
    pub fn with_uid(&self, uid: impl Into<String>) -> Self {
        Self {
            uid: Some(uid.into()),
            ..self.clone()
        }
    }

    /// Copy of this context in destroy mode for `uid`.
    ///
    /// Use [`UNKNOWN_UID`] when no record identifies the experiment.
    #[must_use]
    pub fn with_destroy_flag(&self, uid: impl Into<String>) -> Self {
        Self {
            destroy_uid: Some(uid.into()),
            ..self.clone()
        }
    }

    /// Identifier attached with [`with_uid`](Self::with_uid)
    #[inline]
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    /// `true` if the backend must reverse rather than apply the fault
    #[inline]
    #[must_use]
    pub fn is_destroy(&self) -> bool {
        self.destroy_uid.is_some()
    }

    /// Identifier the destroy flag was set for
    #[inline]
    #[must_use]
    pub fn destroy_uid(&self) -> Option<&str> {
        self.destroy_uid.as_deref()
    }
}
