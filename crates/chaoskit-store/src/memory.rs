//! In-process record store

use crate::error::StoreError;
use crate::record::ExperimentRecord;
use crate::status::{validate_transition, ExperimentStatus};
use crate::store::RecordStore;
use chaoskit_spec::{CommandShape, FlagMap};
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Record store held in memory for the life of the process
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<BTreeMap<String, ExperimentRecord>>,
}

impl MemoryStore {
    /// Create new empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `records`
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = ExperimentRecord>) -> Self {
        let inner = records.into_iter().map(|r| (r.uid.clone(), r)).collect();
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Number of stored records
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Check if store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn insert(&self, record: &ExperimentRecord) -> Result<(), StoreError> {
        let mut guard = self.inner.lock();
        if guard.contains_key(&record.uid) {
            return Err(StoreError::Duplicate(record.uid.clone()));
        }
        guard.insert(record.uid.clone(), record.clone());
        Ok(())
    }

    fn query_by_uid(&self, uid: &str) -> Result<Option<ExperimentRecord>, StoreError> {
        Ok(self.inner.lock().get(uid).cloned())
    }

    fn query_by_command_shape(
        &self,
        shape: &CommandShape,
        flags: &FlagMap,
    ) -> Result<Vec<ExperimentRecord>, StoreError> {
        Ok(self
            .inner
            .lock()
            .values()
            .filter(|r| r.matches(shape, flags))
            .cloned()
            .collect())
    }

    fn update_status(
        &self,
        uid: &str,
        status: ExperimentStatus,
        note: &str,
    ) -> Result<(), StoreError> {
        let mut guard = self.inner.lock();
        let record = guard
            .get_mut(uid)
            .ok_or_else(|| StoreError::NotFound(uid.to_string()))?;
        if record.status == status {
            return Ok(());
        }
        validate_transition(record.status, status)
            .map_err(|e| StoreError::illegal_transition(uid, e))?;
        record.status = status;
        record.error = note.to_string();
        record.update_time = Utc::now();
        Ok(())
    }

    fn delete_by_uid(&self, uid: &str) -> Result<(), StoreError> {
        self.inner.lock().remove(uid);
        Ok(())
    }

    fn list(&self, status: Option<ExperimentStatus>) -> Result<Vec<ExperimentRecord>, StoreError> {
        let mut records: Vec<ExperimentRecord> = self
            .inner
            .lock()
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        records.sort_by(|a, b| b.create_time.cmp(&a.create_time));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(uid: &str, command: &str, sub: &str, flag: &str) -> ExperimentRecord {
        ExperimentRecord::new(uid, &CommandShape::new(command, sub), flag)
    }

    #[test]
    fn insert_and_query() {
        let store = MemoryStore::new();
        store.insert(&record("abc123", "host", "network delay", "interface=eth0")).unwrap();

        let found = store.query_by_uid("abc123").unwrap().unwrap();
        assert_eq!(found.command, "host");
        assert!(store.query_by_uid("missing").unwrap().is_none());
    }

    #[test]
    fn duplicate_insert_rejected() {
        let store = MemoryStore::new();
        let r = record("abc123", "cpu", "fullload", "");
        store.insert(&r).unwrap();
        assert!(matches!(store.insert(&r), Err(StoreError::Duplicate(_))));
    }

    #[test]
    fn update_refreshes_time_and_enforces_lifecycle() {
        let store = MemoryStore::with_records([record("a", "cpu", "fullload", "")]);
        let before = store.query_by_uid("a").unwrap().unwrap().update_time;

        store.update_status("a", ExperimentStatus::Destroyed, "").unwrap();
        let after = store.query_by_uid("a").unwrap().unwrap();
        assert_eq!(after.status, ExperimentStatus::Destroyed);
        assert!(after.update_time >= before);

        // same status is a no-op, leaving the timestamp alone
        store.update_status("a", ExperimentStatus::Destroyed, "").unwrap();
        assert_eq!(store.query_by_uid("a").unwrap().unwrap().update_time, after.update_time);

        let err = store
            .update_status("a", ExperimentStatus::Running, "")
            .unwrap_err();
        assert!(matches!(err, StoreError::IllegalTransition { .. }));
    }

    #[test]
    fn update_missing_is_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.update_status("nope", ExperimentStatus::Destroyed, ""),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn delete_is_idempotent() {
        let store = MemoryStore::with_records([record("a", "cpu", "fullload", "")]);
        store.delete_by_uid("a").unwrap();
        store.delete_by_uid("a").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn list_filters_by_status() {
        let store = MemoryStore::with_records([
            record("a", "cpu", "fullload", ""),
            record("b", "cpu", "fullload", "").with_status(ExperimentStatus::Destroyed),
        ]);
        assert_eq!(store.list(None).unwrap().len(), 2);
        let destroyed = store.list(Some(ExperimentStatus::Destroyed)).unwrap();
        assert_eq!(destroyed.len(), 1);
        assert_eq!(destroyed[0].uid, "b");
    }
}
