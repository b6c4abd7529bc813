//! Executor registry
//!
//! Maps a composite [`ExecutorKey`] to a factory producing a fresh executor.
//! Keys follow the record encoding (see [`CommandShape`]), so the key of a
//! freshly built model and the key split out of its stored record are equal.
//!
//! [`CommandShape`]: crate::model::CommandShape

use crate::executor::{ActionSpec, Executor};
use crate::model::CommandShape;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Builds an executor with its default channel bound
pub type ExecutorFactory = Arc<dyn Fn() -> Box<dyn Executor> + Send + Sync>;

/// Composite registry key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExecutorKey {
    /// Record command
    pub command: String,
    /// Scope token; empty when the sub-command has a single token
    pub scope: String,
    /// Action token
    pub action: String,
}

impl ExecutorKey {
    /// Key from its three parts
    #[must_use]
    pub fn new(
        command: impl Into<String>,
        scope: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            scope: scope.into(),
            action: action.into(),
        }
    }

    /// Key an action spec registers under
    #[must_use]
    pub fn for_action(spec: &ActionSpec) -> Self {
        CommandShape::from_model(&spec.model()).registry_key()
    }
}

impl fmt::Display for ExecutorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scope.is_empty() {
            write!(f, "{} {}", self.command, self.action)
        } else {
            write!(f, "{} {} {}", self.command, self.scope, self.action)
        }
    }
}

/// Registration rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A second executor for the same key
    #[error("executor already registered for `{0}`")]
    Duplicate(ExecutorKey),

    /// Key with no action
    #[error("action name is empty for `{0}`")]
    EmptyAction(ExecutorKey),
}

struct Entry {
    spec: ActionSpec,
    factory: ExecutorFactory,
}

/// Registry of executor factories
#[derive(Default)]
pub struct ExecutorRegistry {
    entries: HashMap<ExecutorKey, Entry>,
}

impl ExecutorRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action under the key its spec encodes to
    pub fn register(
        &mut self,
        spec: ActionSpec,
        factory: ExecutorFactory,
    ) -> Result<ExecutorKey, RegistryError> {
        let key = ExecutorKey::for_action(&spec);
        self.register_at(key, spec, factory)
    }

    /// Register an action under an explicit key; exactly one executor may
    /// exist per key
    pub fn register_at(
        &mut self,
        key: ExecutorKey,
        spec: ActionSpec,
        factory: ExecutorFactory,
    ) -> Result<ExecutorKey, RegistryError> {
        if key.action.is_empty() {
            return Err(RegistryError::EmptyAction(key));
        }
        if self.entries.contains_key(&key) {
            return Err(RegistryError::Duplicate(key));
        }
        tracing::debug!(key = %key, "executor registered");
        self.entries.insert(key.clone(), Entry { spec, factory });
        Ok(key)
    }

    /// Fresh executor for `(command, scope, action)`, if registered
    #[must_use]
    pub fn resolve(&self, command: &str, scope: &str, action: &str) -> Option<Box<dyn Executor>> {
        self.get(&ExecutorKey::new(command, scope, action))
    }

    /// Fresh executor for `key`, if registered
    #[must_use]
    pub fn get(&self, key: &ExecutorKey) -> Option<Box<dyn Executor>> {
        self.entries.get(key).map(|entry| (entry.factory)())
    }

    /// Check if key exists
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &ExecutorKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Declared action for `key`
    #[must_use]
    pub fn action(&self, key: &ExecutorKey) -> Option<&ActionSpec> {
        self.entries.get(key).map(|entry| &entry.spec)
    }

    /// All declared actions, ordered by key
    #[must_use]
    pub fn actions(&self) -> Vec<&ActionSpec> {
        let mut keys: Vec<&ExecutorKey> = self.entries.keys().collect();
        keys.sort();
        keys.into_iter().map(|k| &self.entries[k].spec).collect()
    }

    /// Get number of registered executors
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<String> = self.entries.keys().map(ToString::to_string).collect();
        keys.sort();
        f.debug_struct("ExecutorRegistry")
            .field("count", &self.entries.len())
            .field("keys", &keys)
            .finish()
    }
}
