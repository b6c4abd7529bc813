//! Record queries

use crate::engine::ExperimentEngine;
use crate::error::store_failure;
use chaoskit_spec::{Outcome, Response};
use chaoskit_store::ExperimentStatus;

impl ExperimentEngine {
    /// Record stored under `uid`
    pub fn status(&self, uid: &str) -> Outcome {
        match self.store.query_by_uid(uid) {
            Ok(Some(record)) => Ok(Response::success_with(&record)),
            Ok(None) => Err(Response::data_not_found(uid)),
            Err(e) => Err(store_failure("query", &e)),
        }
    }

    /// All records, newest first, optionally only those in `status`
    pub fn list(&self, status: Option<ExperimentStatus>) -> Outcome {
        self.store
            .list(status)
            .map(|records| Response::success_with(&records))
            .map_err(|e| store_failure("list", &e))
    }
}
