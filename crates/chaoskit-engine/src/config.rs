//! chaoskit configuration
//!
//! Loaded from a TOML file. A missing file means defaults: an on-disk store
//! next to the working directory, `info` logging and no executors.
//!
//! ```toml
//! [store]
//! path = "chaoskit.db"
//!
//! [log]
//! level = "info"
//!
//! [[executors]]
//! target = "network"
//! action = "delay"
//! create = "tc qdisc add dev {interface} root netem delay {time}ms"
//! destroy = "tc qdisc del dev {interface} root"
//!
//! [[executors.flags]]
//! name = "interface"
//! required = true
//! required_when_destroyed = true
//! ```

use crate::error::ConfigError;
use crate::shell::ShellExecutor;
use chaoskit_spec::{ActionSpec, Executor, ExecutorKey, ExecutorRegistry, FlagSpec};
use chaoskit_store::{MemoryStore, RecordStore, SqliteStore};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Store path selecting the process-local in-memory store
pub const MEMORY_STORE: &str = ":memory:";

/// Option names `chaosctl` owns; executors may not declare them as flags
pub const RESERVED_FLAGS: &[&str] = &["config", "log", "force-remove", "target", "help", "version"];

/// Subcommand names generated by the command line parser
pub const RESERVED_COMMANDS: &[&str] = &["help"];

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaosConfig {
    /// Record store settings
    pub store: StoreConfig,
    /// Logging settings
    pub log: LogConfig,
    /// Shell-template executors
    pub executors: Vec<ExecutorConfig>,
}

/// Record store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite file, or [`MEMORY_STORE`]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("chaoskit.db"),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// One shell-template executor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Fault domain
    pub target: String,
    /// Scope; empty or `host` for the default scope
    pub scope: String,
    /// Action name
    pub action: String,
    /// Help text
    pub description: String,
    /// Command applying the fault
    pub create: String,
    /// Command reversing the fault
    pub destroy: String,
    /// Declared parameters
    pub flags: Vec<FlagSpec>,
}

impl ExecutorConfig {
    /// Declared action for the registry and CLI
    #[must_use]
    pub fn action_spec(&self) -> ActionSpec {
        ActionSpec {
            target: self.target.clone(),
            scope: self.scope.clone(),
            action: self.action.clone(),
            description: self.description.clone(),
            flags: self.flags.clone(),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.target.trim().is_empty() || self.action.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "executor needs a target and an action, got `{}` `{}`",
                self.target, self.action
            )));
        }
        for name in [&self.target, &self.scope, &self.action] {
            if name.contains(char::is_whitespace) {
                return Err(ConfigError::Invalid(format!(
                    "`{name}` must be a single word"
                )));
            }
            if name.starts_with('-') || RESERVED_COMMANDS.contains(&name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "`{name}` is not a usable command name"
                )));
            }
        }
        let mut seen = HashSet::new();
        for flag in &self.flags {
            if flag.name.is_empty()
                || flag.name.contains(char::is_whitespace)
                || flag.name.contains('=')
            {
                return Err(ConfigError::Invalid(format!(
                    "illegal flag name `{}` on {} {}",
                    flag.name, self.target, self.action
                )));
            }
            if RESERVED_FLAGS.contains(&flag.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "flag `{}` on {} {} is reserved",
                    flag.name, self.target, self.action
                )));
            }
            if !seen.insert(flag.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "flag `{}` declared twice on {} {}",
                    flag.name, self.target, self.action
                )));
            }
        }
        Ok(())
    }
}

impl ChaosConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `path`; a missing file yields defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::from_toml_str(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config not found, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check executors are well formed
    pub fn validate(&self) -> Result<(), ConfigError> {
        for executor in &self.executors {
            executor.validate()?;
        }
        Ok(())
    }

    /// With store path
    #[must_use]
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store.path = path.into();
        self
    }

    /// Registry holding one shell executor per configured entry
    pub fn build_registry(&self) -> Result<ExecutorRegistry, ConfigError> {
        let mut registry = ExecutorRegistry::new();
        for executor in &self.executors {
            let spec = executor.action_spec();
            let name = ExecutorKey::for_action(&spec).to_string();
            let template = ShellExecutor::new(
                name,
                executor.create.clone(),
                executor.destroy.clone(),
                executor.flags.clone(),
            )
            .local();
            registry.register(
                spec,
                Arc::new(move || Box::new(template.clone()) as Box<dyn Executor>),
            )?;
        }
        Ok(registry)
    }

    /// Open the configured record store
    pub fn open_store(&self) -> Result<Arc<dyn RecordStore>, ConfigError> {
        if self.store.path.as_os_str() == MEMORY_STORE {
            return Ok(Arc::new(MemoryStore::new()));
        }
        Ok(Arc::new(SqliteStore::open(&self.store.path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[store]
path = ":memory:"

[log]
level = "debug"

[[executors]]
target = "network"
action = "delay"
description = "delay network packets"
create = "tc qdisc add dev {interface} root netem delay {time}ms"
destroy = "tc qdisc del dev {interface} root"

[[executors.flags]]
name = "interface"
required = true
required_when_destroyed = true

[[executors.flags]]
name = "time"
required = true

[[executors]]
target = "network"
scope = "docker"
action = "delay"
create = "true"
destroy = "true"
"#;

    #[test]
    fn parses_sample() {
        let config = ChaosConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.executors.len(), 2);
        assert!(config.executors[0].flags[0].required_when_destroyed);
        assert!(!config.executors[0].flags[1].required_when_destroyed);
    }

    #[test]
    fn empty_text_is_default() {
        let config = ChaosConfig::from_toml_str("").unwrap();
        assert_eq!(config, ChaosConfig::default());
        assert_eq!(config.store.path, PathBuf::from("chaoskit.db"));
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = ChaosConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, ChaosConfig::default());
    }

    #[test]
    fn malformed_file_is_error() {
        assert!(matches!(
            ChaosConfig::from_toml_str("[store\npath = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_blank_action() {
        let text = "[[executors]]\ntarget = \"cpu\"\n";
        assert!(matches!(
            ChaosConfig::from_toml_str(text),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_duplicate_flag() {
        let text = r#"
[[executors]]
target = "cpu"
action = "fullload"
[[executors.flags]]
name = "cpu-count"
[[executors.flags]]
name = "cpu-count"
"#;
        assert!(matches!(
            ChaosConfig::from_toml_str(text),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_reserved_command_names() {
        for (target, scope, action) in [("help", "", "stop"), ("pod", "help", "delete"), ("pod", "", "--kill")] {
            let text = format!(
                "[[executors]]\ntarget = \"{target}\"\nscope = \"{scope}\"\naction = \"{action}\"\n"
            );
            assert!(
                matches!(ChaosConfig::from_toml_str(&text), Err(ConfigError::Invalid(_))),
                "{target} {scope} {action} accepted"
            );
        }
    }

    #[test]
    fn rejects_reserved_flag() {
        let text = r#"
[[executors]]
target = "pod"
action = "delete"
[[executors.flags]]
name = "force-remove"
"#;
        assert!(matches!(
            ChaosConfig::from_toml_str(text),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn registry_keys_follow_record_encoding() {
        let registry = ChaosConfig::from_toml_str(SAMPLE)
            .unwrap()
            .build_registry()
            .unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&ExecutorKey::new("network", "", "delay")));
        assert!(registry.contains(&ExecutorKey::new("docker", "network", "delay")));
    }

    #[test]
    fn duplicate_executor_rejected() {
        let text = r#"
[[executors]]
target = "cpu"
action = "fullload"
[[executors]]
target = "cpu"
scope = "host"
action = "fullload"
"#;
        let config = ChaosConfig::from_toml_str(text).unwrap();
        assert!(matches!(config.build_registry(), Err(ConfigError::Registry(_))));
    }

    #[test]
    fn memory_store_path() {
        let config = ChaosConfig::new().with_store_path(MEMORY_STORE);
        let store = config.open_store().unwrap();
        assert!(store.list(None).unwrap().is_empty());
    }
}
