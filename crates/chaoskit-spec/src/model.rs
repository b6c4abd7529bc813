//! Experiment model
//!
//! [`ExpModel`] is the replayable, in-memory description of one experiment.
//! [`CommandShape`] is how a model is written into a record's
//! `command`/`sub_command` pair, and how that pair is split back into the
//! executor registry key.

use crate::flags::{decode_flags, encode_flags, FlagError, FlagMap};
use crate::registry::ExecutorKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved flag carrying an explicit experiment identifier
pub const UID_FLAG: &str = "uid";

/// Name of the default execution scope.
///
/// A model in this scope is recorded under its target alone.
pub const DEFAULT_SCOPE: &str = "host";

/// One experiment: where the fault lives and how it is parameterized
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpModel {
    /// Fault domain, e.g. `network`
    pub target: String,
    /// Sub-domain qualifier; empty means the default scope
    pub scope: String,
    /// Fault action, e.g. `delay`
    pub action_name: String,
    /// Action parameters
    pub action_flags: FlagMap,
}

impl ExpModel {
    /// New model with no flags
    #[must_use]
    pub fn new(
        target: impl Into<String>,
        scope: impl Into<String>,
        action_name: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            scope: scope.into(),
            action_name: action_name.into(),
            action_flags: FlagMap::new(),
        }
    }

    /// Add one flag
    #[must_use]
    pub fn with_flag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.action_flags.insert(key.into(), value.into());
        self
    }

    /// Rebuild a model from a stored action, scope and encoded flags.
    ///
    /// `scope` fills both target and scope, so the result is for replaying
    /// an executor and does not map back to the record's [`CommandShape`].
    pub fn from_commands(action: &str, scope: &str, flags: &str) -> Result<Self, FlagError> {
        Ok(Self {
            target: scope.to_string(),
            scope: scope.to_string(),
            action_name: action.to_string(),
            action_flags: decode_flags(flags)?,
        })
    }

    /// Explicit identifier passed through the `uid` flag, if non-empty
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.action_flags
            .get(UID_FLAG)
            .map(String::as_str)
            .filter(|uid| !uid.is_empty())
    }

    /// Flags as they are matched against stored records (without `uid`)
    #[must_use]
    pub fn matcher_flags(&self) -> FlagMap {
        self.action_flags
            .iter()
            .filter(|(key, _)| key.as_str() != UID_FLAG)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Encoded flags as persisted in a record
    #[must_use]
    pub fn encoded_flags(&self) -> String {
        encode_flags(&self.matcher_flags())
    }

    /// `true` when the model runs in the default scope
    #[must_use]
    pub fn is_default_scope(&self) -> bool {
        self.scope.is_empty() || self.scope == DEFAULT_SCOPE
    }
}

impl fmt::Display for ExpModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_default_scope() {
            write!(f, "{} ", self.scope)?;
        }
        write!(f, "{} {}", self.target, self.action_name)?;
        let flags = encode_flags(&self.action_flags);
        if !flags.is_empty() {
            write!(f, " {flags}")?;
        }
        Ok(())
    }
}

/// The `command`/`sub_command` pair a record is stored under
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandShape {
    /// Top-level command: the scope, or the target in the default scope
    pub command: String,
    /// Whitespace-joined `[scope] action` path
    pub sub_command: String,
}

impl CommandShape {
    /// Shape from stored columns
    #[must_use]
    pub fn new(command: impl Into<String>, sub_command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            sub_command: sub_command.into(),
        }
    }

    /// Shape a model is recorded under.
    ///
    /// Outside the default scope the scope becomes the command and the
    /// sub-command is `"<target> <action>"`; otherwise the target is the
    /// command and the action alone is the sub-command.
    #[must_use]
    pub fn from_model(model: &ExpModel) -> Self {
        if model.is_default_scope() {
            Self::new(model.target.clone(), model.action_name.clone())
        } else {
            Self::new(
                model.scope.clone(),
                format!("{} {}", model.target, model.action_name),
            )
        }
    }

    /// Split the sub-command into `(scope, action)`.
    ///
    /// The last token is the action and the token before it, if any, the
    /// scope. No tokens yields two empty strings.
    #[must_use]
    pub fn split_sub_command(&self) -> (&str, &str) {
        let tokens: Vec<&str> = self.sub_command.split_whitespace().collect();
        match tokens.as_slice() {
            [] => ("", ""),
            [action] => ("", action),
            [.., scope, action] => (scope, action),
        }
    }

    /// Registry key this shape resolves to
    #[must_use]
    pub fn registry_key(&self) -> ExecutorKey {
        let (scope, action) = self.split_sub_command();
        ExecutorKey::new(self.command.as_str(), scope, action)
    }
}

impl fmt::Display for CommandShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.command, self.sub_command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scope_collapses_to_target() {
        let model = ExpModel::new("network", DEFAULT_SCOPE, "delay");
        let shape = CommandShape::from_model(&model);
        assert_eq!(shape, CommandShape::new("network", "delay"));

        let unscoped = ExpModel::new("network", "", "delay");
        assert_eq!(CommandShape::from_model(&unscoped), shape);
    }

    #[test]
    fn scoped_model_uses_scope_as_command() {
        let model = ExpModel::new("network", "docker", "delay");
        let shape = CommandShape::from_model(&model);
        assert_eq!(shape, CommandShape::new("docker", "network delay"));
    }

    #[test]
    fn split_sub_command_cases() {
        assert_eq!(CommandShape::new("host", "network delay").split_sub_command(), ("network", "delay"));
        assert_eq!(CommandShape::new("cpu", "fullload").split_sub_command(), ("", "fullload"));
        assert_eq!(CommandShape::new("cpu", "").split_sub_command(), ("", ""));
        assert_eq!(
            CommandShape::new("k8s", "pod  network delay").split_sub_command(),
            ("network", "delay")
        );
    }

    #[test]
    fn shape_and_model_agree_on_registry_key() {
        let model = ExpModel::new("network", "docker", "delay");
        let key = CommandShape::from_model(&model).registry_key();
        assert_eq!(key, ExecutorKey::new("docker", "network", "delay"));

        let host = ExpModel::new("cpu", "host", "fullload");
        let key = CommandShape::from_model(&host).registry_key();
        assert_eq!(key, ExecutorKey::new("cpu", "", "fullload"));
    }

    #[test]
    fn matcher_flags_drop_uid() {
        let model = ExpModel::new("network", "", "delay")
            .with_flag("interface", "eth0")
            .with_flag(UID_FLAG, "xyz");
        assert_eq!(model.uid(), Some("xyz"));
        assert_eq!(model.encoded_flags(), "interface=eth0");
        assert!(!model.matcher_flags().contains_key(UID_FLAG));
    }

    #[test]
    fn empty_uid_is_absent() {
        let model = ExpModel::new("network", "", "delay").with_flag(UID_FLAG, "");
        assert_eq!(model.uid(), None);
    }

    #[test]
    fn from_commands_decodes_flags() {
        let model = ExpModel::from_commands("delay", "network", "interface=eth0 time=3000").unwrap();
        assert_eq!(model.target, "network");
        assert_eq!(model.scope, "network");
        assert_eq!(model.action_name, "delay");
        assert_eq!(model.action_flags["time"], "3000");
    }
}
