//! Persisted experiment record

use crate::status::ExperimentStatus;
use chaoskit_spec::{decode_flags, CommandShape, FlagMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One stored experiment.
///
/// Everything except `status`, `error` and `update_time` is immutable after
/// insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    /// Primary key
    pub uid: String,
    /// Top-level command the experiment was created with
    pub command: String,
    /// Whitespace-joined `[scope] action` path
    pub sub_command: String,
    /// Encoded action flags
    pub flag: String,
    /// Lifecycle status
    pub status: ExperimentStatus,
    /// Failure note from the last status change
    pub error: String,
    /// Insertion time
    pub create_time: DateTime<Utc>,
    /// Time of the last status change
    pub update_time: DateTime<Utc>,
}

impl ExperimentRecord {
    /// New `Created` record stamped with the current time
    #[must_use]
    pub fn new(uid: impl Into<String>, shape: &CommandShape, flag: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            uid: uid.into(),
            command: shape.command.clone(),
            sub_command: shape.sub_command.clone(),
            flag: flag.into(),
            status: ExperimentStatus::Created,
            error: String::new(),
            create_time: now,
            update_time: now,
        }
    }

    /// Override the status, e.g. for fixtures
    #[must_use]
    pub fn with_status(mut self, status: ExperimentStatus) -> Self {
        self.status = status;
        self
    }

    /// Stored command shape
    #[must_use]
    pub fn shape(&self) -> CommandShape {
        CommandShape::new(self.command.clone(), self.sub_command.clone())
    }

    /// `true` if this record has `shape` and carries every pair of `flags`.
    ///
    /// Records whose flags cannot be decoded never match.
    #[must_use]
    pub fn matches(&self, shape: &CommandShape, flags: &FlagMap) -> bool {
        if self.command != shape.command || self.sub_command != shape.sub_command {
            return false;
        }
        match decode_flags(&self.flag) {
            Ok(stored) => flags
                .iter()
                .all(|(key, value)| stored.get(key) == Some(value)),
            Err(e) => {
                tracing::warn!(uid = %self.uid, error = %e, "skipping record with undecodable flags");
                false
            }
        }
    }
}
