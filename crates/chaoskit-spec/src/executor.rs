//! Executor capability
//!
//! An [`Executor`] knows how to apply and reverse one kind of fault. Which of
//! the two it does is decided by the destroy flag of the [`ExpContext`] it is
//! called with.

use crate::channel::Channel;
use crate::context::ExpContext;
use crate::model::ExpModel;
use crate::response::Response;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Apply/reverse capability for one (command, scope, action) triple
#[async_trait::async_trait]
pub trait Executor: Send + Sync {
    /// Executor name for diagnostics
    fn name(&self) -> &str;

    /// Bind the channel commands are carried out through
    fn set_channel(&mut self, channel: Arc<dyn Channel>);

    /// Apply the fault described by `model`, or reverse it when
    /// `ctx.is_destroy()`. Must be idempotent against an already reversed
    /// fault.
    async fn exec(&self, uid: &str, ctx: &ExpContext, model: &ExpModel) -> Response;
}

/// Declared parameter of an action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlagSpec {
    /// Flag name as passed on the command line
    pub name: String,
    /// Help text
    pub description: String,
    /// Must be supplied when applying the fault
    pub required: bool,
    /// Must be supplied when reversing the fault
    pub required_when_destroyed: bool,
    /// Boolean switch taking no value
    pub no_args: bool,
}

impl FlagSpec {
    /// Optional string flag
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Mark required on create
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark required on destroy
    #[must_use]
    pub fn required_when_destroyed(mut self) -> Self {
        self.required_when_destroyed = true;
        self
    }
}

/// Description of a registered action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSpec {
    /// Fault domain
    pub target: String,
    /// Scope; empty for the default scope
    pub scope: String,
    /// Action name
    pub action: String,
    /// Help text
    pub description: String,
    /// Declared parameters
    pub flags: Vec<FlagSpec>,
}

impl ActionSpec {
    /// Action with no flags
    #[must_use]
    pub fn new(
        target: impl Into<String>,
        scope: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            scope: scope.into(),
            action: action.into(),
            ..Self::default()
        }
    }

    /// Add a declared flag
    #[must_use]
    pub fn with_flag(mut self, flag: FlagSpec) -> Self {
        self.flags.push(flag);
        self
    }

    /// Set help text
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Empty model for this action
    #[must_use]
    pub fn model(&self) -> ExpModel {
        ExpModel::new(self.target.clone(), self.scope.clone(), self.action.clone())
    }
}
