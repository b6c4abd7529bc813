//! chaosctl command tree
//!
//! Action subcommands are generated from the registered executors, once
//! under `create` and once under `destroy`. Default-scope actions are
//! reached as `<target> <action>`, scoped ones as `<scope> <target> <action>`.

use chaoskit_spec::{ActionSpec, ExecutorRegistry, UID_FLAG};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::collections::BTreeMap;

pub(crate) const DEFAULT_CONFIG: &str = "chaoskit.toml";
pub(crate) const CONFIG: &str = "config";
pub(crate) const LOG: &str = "log";
pub(crate) const FORCE_REMOVE: &str = "force-remove";
pub(crate) const TARGET: &str = "target";
pub(crate) const UID_ARG: &str = "UID";
pub(crate) const STATUS: &str = "status";

const DESTROY_EXAMPLE: &str = "\
Examples:
  # Destroy experiment
  chaosctl destroy 47cc0744f1bb

  # Destroy and forcibly remove the record even if the destroy fails
  chaosctl destroy 47cc0744f1bb --force-remove

  # Undo a network delay by its flags
  chaosctl destroy network delay --interface eth0";

/// Which flag requirement applies to generated action commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    Create,
    Destroy,
}

#[derive(Default)]
struct Node<'a> {
    actions: Vec<&'a ActionSpec>,
    targets: BTreeMap<&'a str, Vec<&'a ActionSpec>>,
}

/// Full command tree for `registry`
pub(crate) fn build(registry: &ExecutorRegistry) -> Command {
    let create = Command::new("create")
        .visible_alias("c")
        .about("Create a chaos experiment")
        .subcommand_required(true)
        .arg_required_else_help(true);

    Command::new("chaosctl")
        .version(chaoskit_engine::VERSION)
        .about("Create, track and destroy chaos experiments")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new(CONFIG)
                .long(CONFIG)
                .global(true)
                .default_value(DEFAULT_CONFIG)
                .help("Path to the configuration file"),
        )
        .arg(
            Arg::new(LOG)
                .long(LOG)
                .global(true)
                .help("Log level used when RUST_LOG is unset"),
        )
        .subcommand(action_tree(create, registry, Mode::Create))
        .subcommand(destroy_command(registry))
        .subcommand(
            Command::new("status")
                .visible_alias("s")
                .about("Query experiment records")
                .arg(Arg::new(UID_ARG).help("Experiment uid; lists records when omitted"))
                .arg(
                    Arg::new(STATUS)
                        .long(STATUS)
                        .value_parser(["Created", "Running", "Destroyed", "Error"])
                        .conflicts_with(UID_ARG)
                        .help("Only list records in this status"),
                ),
        )
}

fn destroy_command(registry: &ExecutorRegistry) -> Command {
    let destroy = Command::new("destroy")
        .visible_alias("d")
        .about("Destroy a chaos experiment")
        .long_about(
            "Destroy a chaos experiment by its uid, or undo an action by the flags it was created with",
        )
        .after_help(DESTROY_EXAMPLE)
        .args_conflicts_with_subcommands(true)
        .arg_required_else_help(true)
        .arg(Arg::new(UID_ARG).help("The experiment uid"))
        .arg(
            Arg::new(FORCE_REMOVE)
                .long(FORCE_REMOVE)
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Remove the experiment record even if destroying the experiment failed"),
        )
        .arg(
            Arg::new(TARGET)
                .long(TARGET)
                .global(true)
                .help("Platform the experiment runs on"),
        );
    action_tree(destroy, registry, Mode::Destroy)
}

fn action_tree(mut root: Command, registry: &ExecutorRegistry, mode: Mode) -> Command {
    let mut top: BTreeMap<&str, Node<'_>> = BTreeMap::new();
    for spec in registry.actions() {
        if spec.model().is_default_scope() {
            top.entry(spec.target.as_str()).or_default().actions.push(spec);
        } else {
            top.entry(spec.scope.as_str())
                .or_default()
                .targets
                .entry(spec.target.as_str())
                .or_default()
                .push(spec);
        }
    }

    for (name, node) in top {
        let mut command = Command::new(name.to_string())
            .subcommand_required(true)
            .arg_required_else_help(true);
        for spec in node.actions {
            command = command.subcommand(action_command(spec, mode));
        }
        for (target, specs) in node.targets {
            let mut nested = Command::new(target.to_string())
                .about(format!("{target} experiments in {name}"))
                .subcommand_required(true)
                .arg_required_else_help(true);
            for spec in specs {
                nested = nested.subcommand(action_command(spec, mode));
            }
            command = command.subcommand(nested);
        }
        root = root.subcommand(command);
    }
    root
}

fn action_command(spec: &ActionSpec, mode: Mode) -> Command {
    let mut command = Command::new(spec.action.clone()).about(spec.description.clone());
    for flag in &spec.flags {
        let required = match mode {
            Mode::Create => flag.required,
            Mode::Destroy => flag.required_when_destroyed,
        };
        let help = if required {
            format!("{} (required)", flag.description)
        } else {
            flag.description.clone()
        };
        let action = if flag.no_args {
            ArgAction::SetTrue
        } else {
            ArgAction::Set
        };
        command = command.arg(
            Arg::new(flag.name.clone())
                .long(flag.name.clone())
                .action(action)
                .required(required)
                .help(help),
        );
    }
    if !spec.flags.iter().any(|f| f.name == UID_FLAG) {
        command = command.arg(
            Arg::new(UID_FLAG)
                .long(UID_FLAG)
                .help("Experiment uid; generated when omitted"),
        );
    }
    command
}

/// Subcommand names below `matches` down to the action, and the action's matches
pub(crate) fn action_path(matches: &ArgMatches) -> (Vec<&str>, &ArgMatches) {
    let mut path = Vec::new();
    let mut current = matches;
    while let Some((name, sub)) = current.subcommand() {
        path.push(name);
        current = sub;
    }
    (path, current)
}

/// Value of `--<name>` in raw arguments, before the command tree exists
pub(crate) fn raw_option<S: AsRef<str>>(args: &[S], name: &str) -> Option<String> {
    let flag = format!("--{name}");
    let prefixed = format!("--{name}=");
    let mut args = args.iter().map(AsRef::<str>::as_ref);
    while let Some(arg) = args.next() {
        if arg == flag {
            if let Some(value) = args.next() {
                return Some(value.to_string());
            }
        } else if let Some(value) = arg.strip_prefix(prefixed.as_str()) {
            return Some(value.to_string());
        }
    }
    None
}

/// Config file named on the command line, or the default
pub(crate) fn config_path<S: AsRef<str>>(args: &[S]) -> String {
    raw_option(args, CONFIG).unwrap_or_else(|| DEFAULT_CONFIG.to_string())
}
