//! chaosctl - operator CLI for chaoskit
//!
//! Prints one JSON response on stdout. Exit codes: 0 on success, 1 when the
//! response is a failure, 2 when configuration or the record store cannot be
//! loaded.

mod cli;
mod commands;
mod logging;

use anyhow::{Context, Result};
use chaoskit_engine::{ChaosConfig, ExperimentEngine};
use std::process::ExitCode;
use std::sync::Arc;

const EXIT_FAILURE: u8 = 1;
const EXIT_BOOTSTRAP: u8 = 2;

fn load_config(path: &str) -> Result<ChaosConfig> {
    ChaosConfig::load(path).with_context(|| format!("failed to load config `{path}`"))
}

fn open_engine(config: &ChaosConfig) -> Result<ExperimentEngine> {
    let registry = config
        .build_registry()
        .context("failed to register executors")?;
    let store = config.open_store().with_context(|| {
        format!("failed to open record store `{}`", config.store.path.display())
    })?;
    Ok(ExperimentEngine::new(store, Arc::new(registry)))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let config_path = cli::config_path(&args);

    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("chaosctl: {e:#}");
            return ExitCode::from(EXIT_BOOTSTRAP);
        }
    };

    // The subscriber must exist before the store and registry log anything.
    let level = cli::raw_option(&args, cli::LOG).unwrap_or_else(|| config.log.level.clone());
    logging::init(&level);
    tracing::debug!(path = %config_path, executors = config.executors.len(), "config loaded");

    let engine = match open_engine(&config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("chaosctl: {e:#}");
            return ExitCode::from(EXIT_BOOTSTRAP);
        }
    };

    let matches = cli::build(engine.registry()).get_matches_from(args);
    tracing::debug!(executors = engine.registry().len(), "chaosctl ready");

    match commands::dispatch(&engine, &matches).await {
        Ok(resp) => {
            println!("{}", resp.print());
            ExitCode::SUCCESS
        }
        Err(resp) => {
            tracing::error!(code = %resp.kind(), error = %resp.err, "command failed");
            println!("{}", resp.print());
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
