//! Experiment lifecycle status and the transitions between them

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a stored experiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperimentStatus {
    /// Recorded, fault not yet applied
    Created,
    /// Fault applied and active
    Running,
    /// Fault reversed; terminal
    Destroyed,
    /// Applying the fault failed
    Error,
}

impl ExperimentStatus {
    /// Name as persisted
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Running => "Running",
            Self::Destroyed => "Destroyed",
            Self::Error => "Error",
        }
    }

    /// `true` once no further transition is possible
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        allowed_transitions(self).is_empty()
    }
}

impl fmt::Display for ExperimentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown status text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown experiment status `{0}`")]
pub struct ParseStatusError(pub String);

impl FromStr for ExperimentStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(Self::Created),
            "running" | "success" => Ok(Self::Running),
            "destroyed" => Ok(Self::Destroyed),
            "error" => Ok(Self::Error),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// Transition not permitted by the lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal status transition {from} -> {to}")]
pub struct TransitionError {
    /// Current status
    pub from: ExperimentStatus,
    /// Requested status
    pub to: ExperimentStatus,
}

/// Validates a status transition.
///
/// Re-applying the current status is accepted; callers treat it as a no-op.
pub fn validate_transition(
    from: ExperimentStatus,
    to: ExperimentStatus,
) -> Result<(), TransitionError> {
    if from == to || allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(TransitionError { from, to })
    }
}

/// Statuses reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: ExperimentStatus) -> &'static [ExperimentStatus] {
    use ExperimentStatus::*;
    match from {
        Created => &[Running, Error, Destroyed],
        Running => &[Destroyed, Error],
        Error => &[Destroyed],
        Destroyed => &[],
    }
}
