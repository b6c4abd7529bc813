//! Experiment engine
//!
//! [`ExperimentEngine`] ties the record store to the executor registry. Its
//! operations live next to their concerns: [`create`](crate::create),
//! [`destroy`](crate::destroy), [`matcher`](crate::matcher) and
//! [`status`](crate::status).

use chaoskit_spec::ExecutorRegistry;
use chaoskit_store::RecordStore;
use std::fmt;
use std::sync::Arc;

/// Entry point for experiment lifecycle operations.
///
/// Every call is a single sequential chain of store access, executor
/// resolution, exec and store update. The engine never holds a store lock
/// across an exec.
#[derive(Clone)]
pub struct ExperimentEngine {
    pub(crate) store: Arc<dyn RecordStore>,
    pub(crate) registry: Arc<ExecutorRegistry>,
}

impl ExperimentEngine {
    /// Engine over `store` resolving executors in `registry`
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, registry: Arc<ExecutorRegistry>) -> Self {
        Self { store, registry }
    }

    /// Backing record store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Executor registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<ExecutorRegistry> {
        &self.registry
    }
}

impl fmt::Debug for ExperimentEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExperimentEngine")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
