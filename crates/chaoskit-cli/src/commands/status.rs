//! `chaosctl status`

use crate::cli::{STATUS, UID_ARG};
use chaoskit_engine::ExperimentEngine;
use chaoskit_spec::{Outcome, Response};
use chaoskit_store::ExperimentStatus;
use clap::ArgMatches;

pub(crate) fn run(engine: &ExperimentEngine, matches: &ArgMatches) -> Outcome {
    if let Some(uid) = matches.get_one::<String>(UID_ARG) {
        return engine.status(uid);
    }
    let status = matches
        .get_one::<String>(STATUS)
        .map(|s| s.parse::<ExperimentStatus>())
        .transpose()
        .map_err(|e| Response::parameter_illegal(STATUS, e))?;
    engine.list(status)
}
