//! Subcommand handlers
//!
//! Every handler returns an [`Outcome`]; `main` prints it and picks the exit
//! code.

pub(crate) mod create;
pub(crate) mod destroy;
pub(crate) mod status;

use chaoskit_engine::ExperimentEngine;
use chaoskit_spec::{ExecutorRegistry, ExpModel, Outcome, Response, UID_FLAG};
use clap::ArgMatches;

pub(crate) async fn dispatch(engine: &ExperimentEngine, matches: &ArgMatches) -> Outcome {
    match matches.subcommand() {
        Some(("create", sub)) => create::run(engine, sub).await,
        Some(("destroy", sub)) => destroy::run(engine, sub).await,
        Some(("status", sub)) => status::run(engine, sub),
        Some((other, _)) => Err(Response::handler_not_found(other)),
        None => Err(Response::handler_not_found("chaosctl")),
    }
}

/// Model for the action at `path`, filled from the action's matches.
///
/// `path` is `[target, action]` in the default scope or
/// `[scope, target, action]` otherwise.
pub(crate) fn model_from(
    registry: &ExecutorRegistry,
    path: &[&str],
    leaf: &ArgMatches,
) -> Result<ExpModel, Response> {
    let (scope, target, action) = match path {
        [target, action] => ("", *target, *action),
        [scope, target, action] => (*scope, *target, *action),
        _ => return Err(Response::handler_not_found(&path.join(" "))),
    };

    let spec = registry
        .actions()
        .into_iter()
        .find(|spec| {
            spec.target == target
                && spec.action == action
                && if scope.is_empty() {
                    spec.model().is_default_scope()
                } else {
                    spec.scope == scope
                }
        })
        .ok_or_else(|| Response::handler_not_found(&path.join(" ")))?;

    let mut model = spec.model();
    for flag in &spec.flags {
        if flag.no_args {
            if leaf.get_flag(&flag.name) {
                model.action_flags.insert(flag.name.clone(), "true".to_string());
            }
        } else if let Some(value) = leaf.get_one::<String>(&flag.name) {
            model.action_flags.insert(flag.name.clone(), value.clone());
        }
    }
    if let Some(uid) = leaf.get_one::<String>(UID_FLAG) {
        model.action_flags.insert(UID_FLAG.to_string(), uid.clone());
    }
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli;
    use chaoskit_engine::ChaosConfig;
    use chaoskit_spec::ErrorKind;
    use std::sync::Arc;

    const CONFIG_TEXT: &str = r#"
[store]
path = ":memory:"

[[executors]]
target = "process"
action = "stop"
create = "echo stop {name}"
destroy = "echo resume {name}"

[[executors.flags]]
name = "name"
required = true
required_when_destroyed = true

[[executors.flags]]
name = "ignore-not-found"
no_args = true

[[executors]]
target = "process"
scope = "docker"
action = "stop"
create = "true"
destroy = "true"
"#;

    fn setup() -> (ExperimentEngine, clap::Command) {
        let config = ChaosConfig::from_toml_str(CONFIG_TEXT).unwrap();
        let registry = Arc::new(config.build_registry().unwrap());
        let command = cli::build(&registry);
        (ExperimentEngine::new(config.open_store().unwrap(), registry), command)
    }

    async fn run(engine: &ExperimentEngine, command: &clap::Command, args: &[&str]) -> Outcome {
        let matches = command.clone().try_get_matches_from(args).unwrap();
        dispatch(engine, &matches).await
    }

    #[test]
    fn model_carries_flags_and_uid() {
        let (engine, command) = setup();
        let matches = command
            .try_get_matches_from([
                "chaosctl",
                "create",
                "process",
                "stop",
                "--name",
                "nginx",
                "--ignore-not-found",
                "--uid",
                "u1",
            ])
            .unwrap();
        let (_, create) = matches.subcommand().unwrap();
        let (path, leaf) = cli::action_path(create);
        let model = model_from(engine.registry(), &path, leaf).unwrap();

        assert_eq!(model.target, "process");
        assert_eq!(model.action_name, "stop");
        assert_eq!(model.action_flags["name"], "nginx");
        assert_eq!(model.action_flags["ignore-not-found"], "true");
        assert_eq!(model.uid(), Some("u1"));
    }

    #[test]
    fn scoped_path_selects_scoped_action() {
        let (engine, command) = setup();
        let matches = command
            .try_get_matches_from(["chaosctl", "create", "docker", "process", "stop"])
            .unwrap();
        let (_, create) = matches.subcommand().unwrap();
        let (path, leaf) = cli::action_path(create);
        let model = model_from(engine.registry(), &path, leaf).unwrap();
        assert_eq!(model.scope, "docker");
    }

    #[tokio::test]
    async fn create_then_destroy_by_uid() {
        let (engine, command) = setup();

        let created = run(
            &engine,
            &command,
            &["chaosctl", "create", "process", "stop", "--name", "nginx"],
        )
        .await
        .unwrap();
        let uid = created.result.unwrap().as_str().unwrap().to_string();

        let destroyed = run(&engine, &command, &["chaosctl", "destroy", uid.as_str()]).await;
        assert!(destroyed.is_ok());

        let status = run(&engine, &command, &["chaosctl", "status", uid.as_str()])
            .await
            .unwrap();
        assert_eq!(status.result.unwrap()["status"], "Destroyed");
    }

    #[tokio::test]
    async fn destroy_by_flags_marks_matching_records() {
        let (engine, command) = setup();
        run(
            &engine,
            &command,
            &["chaosctl", "create", "process", "stop", "--name", "nginx", "--uid", "a1"],
        )
        .await
        .unwrap();

        let resp = run(
            &engine,
            &command,
            &["chaosctl", "destroy", "process", "stop", "--name", "nginx"],
        )
        .await;
        assert!(resp.is_ok());

        let listed = run(&engine, &command, &["chaosctl", "status", "--status", "Destroyed"])
            .await
            .unwrap();
        assert_eq!(listed.result.unwrap().as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn destroy_unknown_uid_fails() {
        let (engine, command) = setup();
        let err = run(&engine, &command, &["chaosctl", "destroy", "nope"])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DataNotFound);
    }
}
