//! Destroy by identifier
//!
//! Looks a record up by uid, reverses its fault through the executor that
//! applied it and marks it `Destroyed`. With force-remove the record is then
//! deleted whatever the destroy outcome; [`compose_force_remove`] folds both
//! results into one response without hiding either failure.

use crate::engine::ExperimentEngine;
use crate::error::store_failure;
use crate::reconstruct::reconstruct;
use chaoskit_spec::{ExpContext, Outcome, Response};
use chaoskit_store::{ExperimentRecord, ExperimentStatus, StoreError};

impl ExperimentEngine {
    /// Destroy the experiment stored under `uid`.
    ///
    /// A record that is already `Destroyed` yields the same summary every
    /// time without running its executor again.
    pub async fn destroy_by_uid(&self, ctx: &ExpContext, uid: &str, force_remove: bool) -> Outcome {
        tracing::info!(uid, force_remove, "destroy by uid");
        let destroyed = self.destroy_record(ctx, uid).await;
        let removal = force_remove.then(|| self.store.delete_by_uid(uid));
        compose_force_remove(uid, destroyed, removal)
    }

    async fn destroy_record(&self, ctx: &ExpContext, uid: &str) -> Outcome {
        let record = match self.store.query_by_uid(uid) {
            Ok(Some(record)) => record,
            Ok(None) => return Err(Response::data_not_found(uid)),
            Err(e) => return Err(store_failure("query", &e)),
        };

        if record.status == ExperimentStatus::Destroyed {
            tracing::debug!(uid, "experiment already destroyed");
            return Ok(Response::success(destroyed_summary(&record)));
        }

        let (executor, model) = reconstruct(&self.registry, &record)?;
        let ctx = ctx.with_uid(uid).with_destroy_flag(uid);

        executor.exec(uid, &ctx, &model).await.into_outcome()?;

        if let Err(e) = self.store.update_status(uid, ExperimentStatus::Destroyed, "") {
            tracing::warn!(uid, error = %e, "experiment destroyed but status update failed");
        }
        Ok(Response::success_with(&model))
    }
}

/// Summary returned for a record destroyed earlier
#[must_use]
pub fn destroyed_summary(record: &ExperimentRecord) -> String {
    format!(
        "command: {} {} {}, destroy time: {}",
        record.command, record.sub_command, record.flag, record.update_time
    )
}

/// Combine a destroy outcome with the optional force-remove result.
///
/// `removal` is `None` when force-remove was not requested.
pub fn compose_force_remove(
    uid: &str,
    destroyed: Outcome,
    removal: Option<Result<(), StoreError>>,
) -> Outcome {
    match (destroyed, removal) {
        (Ok(resp), None | Some(Ok(()))) => Ok(resp),
        (Ok(_), Some(Err(e))) => Err(Response::database_error(
            "remove",
            format!("the {uid} has been destroyed, but forcibly remove resource failed, {e}"),
        )),
        (Err(resp), Some(Ok(()))) => {
            let err = format!(
                "forcibly remove {uid} resource success, but destroy the experiment failed, {}",
                resp.err
            );
            Err(resp.with_err(err))
        }
        (Err(resp), Some(Err(e))) => {
            let err = format!(
                "destroy and forcibly remove the {uid} experiment failed, {}, {e}",
                resp.err
            );
            Err(resp.with_err(err))
        }
        (Err(resp), None) => Err(resp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaoskit_spec::ErrorKind;

    fn exec_failed() -> Outcome {
        Err(Response::exec_command_error("tc", "no such device"))
    }

    fn removal_failed() -> Option<Result<(), StoreError>> {
        Some(Err(StoreError::Unavailable("disk full".into())))
    }

    #[test]
    fn success_without_removal_passes_through() {
        let resp = compose_force_remove("a", Ok(Response::success("done")), None).unwrap();
        assert_eq!(resp, Response::success("done"));
    }

    #[test]
    fn success_with_removal_passes_through() {
        let resp = compose_force_remove("a", Ok(Response::success("done")), Some(Ok(()))).unwrap();
        assert_eq!(resp, Response::success("done"));
    }

    #[test]
    fn destroyed_but_removal_failed() {
        let err = compose_force_remove("a", Ok(Response::success("done")), removal_failed()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DatabaseError);
        assert!(err.err.contains("the a has been destroyed, but forcibly remove resource failed"));
        assert!(err.err.contains("disk full"));
    }

    #[test]
    fn removed_but_destroy_failed_keeps_code() {
        let err = compose_force_remove("a", exec_failed(), Some(Ok(()))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExecCommandError);
        assert!(err.err.starts_with("forcibly remove a resource success, but destroy the experiment failed"));
        assert!(err.err.contains("no such device"));
    }

    #[test]
    fn both_failed_discloses_both() {
        let err = compose_force_remove("a", exec_failed(), removal_failed()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExecCommandError);
        assert!(err.err.starts_with("destroy and forcibly remove the a experiment failed"));
        assert!(err.err.contains("no such device"));
        assert!(err.err.contains("disk full"));
    }

    #[test]
    fn destroy_failed_without_removal_is_verbatim() {
        let err = compose_force_remove("a", exec_failed(), None).unwrap_err();
        assert_eq!(err, Response::exec_command_error("tc", "no such device"));
    }
}
