//! Record store contract

use crate::error::StoreError;
use crate::record::ExperimentRecord;
use crate::status::ExperimentStatus;
use chaoskit_spec::{CommandShape, FlagMap};

/// Persistent table of experiment records keyed by uid.
///
/// Implementations provide per-record atomic read-modify-write; callers never
/// hold a lock across executor calls.
pub trait RecordStore: Send + Sync {
    /// Insert a new record; fails with [`StoreError::Duplicate`] if the uid exists
    fn insert(&self, record: &ExperimentRecord) -> Result<(), StoreError>;

    /// Record for `uid`, `None` if absent
    fn query_by_uid(&self, uid: &str) -> Result<Option<ExperimentRecord>, StoreError>;

    /// All records stored under `shape` whose flags contain every pair of `flags`
    fn query_by_command_shape(
        &self,
        shape: &CommandShape,
        flags: &FlagMap,
    ) -> Result<Vec<ExperimentRecord>, StoreError>;

    /// Move `uid` to `status`, recording `note` and refreshing its update time.
    ///
    /// Setting the current status again is a no-op.
    fn update_status(
        &self,
        uid: &str,
        status: ExperimentStatus,
        note: &str,
    ) -> Result<(), StoreError>;

    /// Remove `uid`; removing an absent record succeeds
    fn delete_by_uid(&self, uid: &str) -> Result<(), StoreError>;

    /// All records, newest first, optionally restricted to one status
    fn list(&self, status: Option<ExperimentStatus>) -> Result<Vec<ExperimentRecord>, StoreError>;
}
