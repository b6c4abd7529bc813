//! Create an experiment
//!
//! Records the experiment under its command shape, applies the fault and
//! moves the record to `Running` or `Error`.

use crate::engine::ExperimentEngine;
use crate::error::store_failure;
use chaoskit_spec::{CommandShape, ExpContext, ExpModel, Outcome, Response, UID_FLAG};
use chaoskit_store::{ExperimentRecord, ExperimentStatus, StoreError};

/// Length of generated experiment identifiers
pub const UID_LEN: usize = 16;

/// Fresh random identifier of [`UID_LEN`] hex characters
#[must_use]
pub fn new_uid() -> String {
    let mut uid = uuid::Uuid::new_v4().simple().to_string();
    uid.truncate(UID_LEN);
    uid
}

impl ExperimentEngine {
    /// Apply the experiment described by `model`.
    ///
    /// Returns the experiment uid as payload on success. The executor is
    /// resolved before anything is stored.
    pub async fn create(&self, ctx: &ExpContext, model: &ExpModel) -> Outcome {
        let shape = CommandShape::from_model(model);
        let key = shape.registry_key();
        let executor = self
            .registry
            .get(&key)
            .ok_or_else(|| Response::handler_not_found(&key.to_string()))?;

        let uid = model.uid().map_or_else(new_uid, str::to_string);
        let record = ExperimentRecord::new(uid.as_str(), &shape, model.encoded_flags());
        self.store.insert(&record).map_err(|e| match e {
            StoreError::Duplicate(_) => Response::parameter_illegal(UID_FLAG, e),
            other => store_failure("insert", &other),
        })?;
        tracing::info!(uid = %uid, %shape, "experiment created");

        let ctx = ctx.with_uid(uid.as_str());
        let resp = executor.exec(&uid, &ctx, model).await;

        if resp.success {
            self.set_status(&uid, ExperimentStatus::Running, "");
            Ok(Response::success(uid))
        } else {
            tracing::warn!(uid = %uid, error = %resp.err, "experiment failed to apply");
            self.set_status(&uid, ExperimentStatus::Error, &resp.err);
            Err(resp)
        }
    }

    fn set_status(&self, uid: &str, status: ExperimentStatus, note: &str) {
        if let Err(e) = self.store.update_status(uid, status, note) {
            tracing::warn!(uid, %status, error = %e, "failed to update experiment status");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_uids_are_short_hex() {
        let uid = new_uid();
        assert_eq!(uid.len(), UID_LEN);
        assert!(uid.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(uid, new_uid());
    }
}
