//! Destroy by matchers
//!
//! The undo of an action command. An explicit `uid` flag is tried first;
//! when it names no record the fault is reversed through a freshly resolved
//! executor and every record with the same command shape and flags is marked
//! `Destroyed`. That bookkeeping is best-effort and only ever logged.

use crate::engine::ExperimentEngine;
use chaoskit_spec::{
    CommandShape, ErrorKind, ExpContext, ExpModel, LocalChannel, Outcome, Response, UNKNOWN_UID,
};
use chaoskit_store::ExperimentStatus;
use std::sync::Arc;

impl ExperimentEngine {
    /// Destroy the experiment described by `model`
    pub async fn destroy_by_matchers(
        &self,
        ctx: &ExpContext,
        model: &ExpModel,
        force_remove: bool,
    ) -> Outcome {
        tracing::info!(%model, "destroy by matchers");

        let mut ctx = ctx.clone();
        if let Some(uid) = model.uid() {
            ctx = ctx.with_uid(uid);
            match self.destroy_by_uid(&ctx, uid, force_remove).await {
                Ok(resp) => return Ok(resp),
                Err(resp) if resp.kind() != ErrorKind::DataNotFound => return Err(resp),
                Err(_) => {
                    tracing::warn!(uid, "uid not found, using matchers to continue to destroy");
                }
            }
        }
        if force_remove {
            tracing::warn!("the force-remove flag does not work if the uid does not exist");
        }

        let shape = CommandShape::from_model(model);
        let key = shape.registry_key();
        let Some(mut executor) = self.registry.get(&key) else {
            return Err(Response::handler_not_found(&key.to_string()));
        };
        executor.set_channel(Arc::new(LocalChannel::new()));

        let ctx = ctx.with_destroy_flag(UNKNOWN_UID);
        executor.exec(UNKNOWN_UID, &ctx, model).await.into_outcome()?;

        tracing::info!(
            command = %shape.command,
            sub_command = %shape.sub_command,
            "destroyed by model, reconciling records"
        );
        self.mark_matching_destroyed(&shape, model);

        Ok(Response::success_with(model))
    }

    fn mark_matching_destroyed(&self, shape: &CommandShape, model: &ExpModel) {
        let records = match self.store.query_by_command_shape(shape, &model.matcher_flags()) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(%shape, error = %e, "destroy success but query records failed");
                return;
            }
        };
        for record in records
            .iter()
            .filter(|r| r.status != ExperimentStatus::Destroyed)
        {
            if let Err(e) = self
                .store
                .update_status(&record.uid, ExperimentStatus::Destroyed, "")
            {
                tracing::warn!(uid = %record.uid, error = %e, "failed to mark record destroyed");
            }
        }
    }
}
