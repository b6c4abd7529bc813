//! `chaosctl destroy`
//!
//! A positional uid destroys that record; an action path undoes the action
//! by its flags.

use crate::cli::{action_path, FORCE_REMOVE, TARGET, UID_ARG};
use crate::commands::model_from;
use chaoskit_engine::ExperimentEngine;
use chaoskit_spec::{ExpContext, Outcome};
use clap::ArgMatches;

pub(crate) async fn run(engine: &ExperimentEngine, matches: &ArgMatches) -> Outcome {
    let ctx = ExpContext::new();

    if let Some(uid) = matches.get_one::<String>(UID_ARG) {
        let force_remove = matches.get_flag(FORCE_REMOVE);
        let target = matches.get_one::<String>(TARGET).map_or("", String::as_str);
        tracing::info!(uid = %uid, force_remove, target, "destroy by uid");
        return engine
            .destroy_by_uid(&ctx.with_uid(uid.as_str()), uid, force_remove)
            .await;
    }

    let (path, leaf) = action_path(matches);
    let model = model_from(engine.registry(), &path, leaf)?;
    engine
        .destroy_by_matchers(&ctx, &model, leaf.get_flag(FORCE_REMOVE))
        .await
}
