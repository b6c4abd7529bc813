//! `chaosctl create`

use crate::cli::action_path;
use crate::commands::model_from;
use chaoskit_engine::ExperimentEngine;
use chaoskit_spec::{ExpContext, Outcome};
use clap::ArgMatches;

pub(crate) async fn run(engine: &ExperimentEngine, matches: &ArgMatches) -> Outcome {
    let (path, leaf) = action_path(matches);
    let model = model_from(engine.registry(), &path, leaf)?;
    tracing::info!(%model, "create");
    engine.create(&ExpContext::new(), &model).await
}
