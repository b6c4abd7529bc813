//! Error types for the chaoskit engine
//!
//! Internal failures are typed here; everything that reaches an operator is
//! converted into a [`Response`] carrying the matching [`ErrorKind`].
//!
//! [`ErrorKind`]: chaoskit_spec::ErrorKind

use chaoskit_spec::{FlagError, RegistryError, Response};
use chaoskit_store::StoreError;
use std::path::PathBuf;

/// A stored record could not be turned back into an executable experiment
#[derive(Debug, thiserror::Error)]
pub enum ReconstructError {
    /// No executor registered for the record's command triple
    #[error("can't find executor for {command}, {sub_command}")]
    HandlerNotFound {
        /// Stored command
        command: String,
        /// Stored sub-command
        sub_command: String,
    },

    /// Stored flags do not decode
    #[error("stored flags of `{uid}` are malformed: {source}")]
    InvalidFlags {
        /// Record uid
        uid: String,
        /// Decoding failure
        #[source]
        source: FlagError,
    },
}

impl From<ReconstructError> for Response {
    fn from(err: ReconstructError) -> Self {
        match err {
            ReconstructError::HandlerNotFound { .. } => Response::handler_exec_not_found(err),
            ReconstructError::InvalidFlags { .. } => Response::parameter_illegal("flag", err),
        }
    }
}

/// Configuration could not be loaded or applied
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file unreadable
    #[error("io error reading {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the schema
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config parsed but is inconsistent
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// Executor registration failed
    #[error("executor registry: {0}")]
    Registry(#[from] RegistryError),

    /// Record store could not be opened
    #[error("record store: {0}")]
    Store(#[from] StoreError),
}

/// Map a store failure during `op` to a `DatabaseError` response
pub(crate) fn store_failure(op: &str, err: &StoreError) -> Response {
    Response::database_error(op, err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chaoskit_spec::ErrorKind;

    #[test]
    fn handler_not_found_maps_to_exec_not_found() {
        let err = ReconstructError::HandlerNotFound {
            command: "host".into(),
            sub_command: "network delay".into(),
        };
        let resp = Response::from(err);
        assert_eq!(resp.kind(), ErrorKind::HandlerExecNotFound);
        assert!(resp.err.contains("host, network delay"));
    }

    #[test]
    fn invalid_flags_map_to_parameter_illegal() {
        let err = ReconstructError::InvalidFlags {
            uid: "abc".into(),
            source: FlagError::UnterminatedQuote("cmd".into()),
        };
        assert_eq!(Response::from(err).kind(), ErrorKind::ParameterIllegal);
    }
}
