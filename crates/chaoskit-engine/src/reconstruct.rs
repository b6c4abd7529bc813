//! Command model reconstruction
//!
//! Turns a stored [`ExperimentRecord`] back into the executor that applied it
//! and a replayable [`ExpModel`]. The sub-command split inverts
//! [`CommandShape::from_model`](chaoskit_spec::CommandShape::from_model).

use crate::error::ReconstructError;
use chaoskit_spec::{ExecutorRegistry, ExpModel, Executor};
use chaoskit_store::ExperimentRecord;

/// Resolve the executor and model for `record`.
///
/// The last sub-command token is the action and the one before it the scope.
/// A single token leaves the scope empty for lookup, after which the record's
/// command doubles as the effective scope of the model.
pub fn reconstruct(
    registry: &ExecutorRegistry,
    record: &ExperimentRecord,
) -> Result<(Box<dyn Executor>, ExpModel), ReconstructError> {
    let key = record.shape().registry_key();

    let executor = registry
        .get(&key)
        .ok_or_else(|| ReconstructError::HandlerNotFound {
            command: record.command.clone(),
            sub_command: record.sub_command.clone(),
        })?;

    let scope = if key.scope.is_empty() {
        record.command.as_str()
    } else {
        key.scope.as_str()
    };

    let model = ExpModel::from_commands(&key.action, scope, &record.flag).map_err(|source| {
        ReconstructError::InvalidFlags {
            uid: record.uid.clone(),
            source,
        }
    })?;

    Ok((executor, model))
}
