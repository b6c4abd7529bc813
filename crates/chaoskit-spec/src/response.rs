//! Response contract shared by executors, the engine and the CLI
//!
//! A [`Response`] is both the return value of an [`Executor::exec`] call and the
//! terminal output of `chaosctl`. A failed response doubles as an error value:
//! it implements [`std::error::Error`] and travels on the `Err` side of an
//! [`Outcome`].
//!
//! [`Executor::exec`]: crate::Executor::exec

use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Result of an engine operation: `Ok` carries a successful response,
/// `Err` a failed one.
pub type Outcome = Result<Response, Response>;

/// Failure taxonomy with stable numeric codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Success
    Ok,
    /// A required parameter was not supplied
    ParameterLess,
    /// A parameter value could not be interpreted
    ParameterIllegal,
    /// No record exists for the identifier
    DataNotFound,
    /// Record store read, write or delete failed
    DatabaseError,
    /// No executor registered for the derived command triple
    HandlerNotFound,
    /// The executor for a stored record could not be resolved
    HandlerExecNotFound,
    /// Executor has no execution channel bound
    ChannelNotFound,
    /// The channel ran the command and it failed
    ExecCommandError,
}

impl ErrorKind {
    /// Numeric code reported to operators
    #[inline]
    #[must_use]
    pub const fn code(self) -> u32 {
        match self {
            Self::Ok => 200,
            Self::ParameterLess => 45000,
            Self::ParameterIllegal => 45001,
            Self::DataNotFound => 47000,
            Self::DatabaseError => 51000,
            Self::HandlerNotFound => 53000,
            Self::HandlerExecNotFound => 53001,
            Self::ChannelNotFound => 54000,
            Self::ExecCommandError => 56000,
        }
    }

    /// Stable name used in logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "Ok",
            Self::ParameterLess => "ParameterLess",
            Self::ParameterIllegal => "ParameterIllegal",
            Self::DataNotFound => "DataNotFound",
            Self::DatabaseError => "DatabaseError",
            Self::HandlerNotFound => "HandlerNotFound",
            Self::HandlerExecNotFound => "HandlerExecNotFound",
            Self::ChannelNotFound => "ChannelNotFound",
            Self::ExecCommandError => "ExecCommandError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.as_str(), self.code())
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.code())
    }
}

/// Outcome of an executor call, and the printable result of a command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// Failure category, [`ErrorKind::Ok`] on success
    pub code: ErrorKind,
    /// Discriminant between success and failure
    pub success: bool,
    /// Human readable failure message, empty on success
    #[serde(skip_serializing_if = "String::is_empty")]
    pub err: String,
    /// Payload of a successful call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl Response {
    /// Successful response carrying `result`
    #[must_use]
    pub fn success(result: impl Into<Value>) -> Self {
        Self {
            code: ErrorKind::Ok,
            success: true,
            err: String::new(),
            result: Some(result.into()),
        }
    }

    /// Successful response carrying any serializable payload
    #[must_use]
    pub fn success_with<T: Serialize>(payload: &T) -> Self {
        Self::success(serde_json::to_value(payload).unwrap_or_default())
    }

    /// Failed response of the given kind
    #[must_use]
    pub fn fail(code: ErrorKind, err: impl Into<String>) -> Self {
        Self {
            code,
            success: false,
            err: err.into(),
            result: None,
        }
    }

    /// `uid` has no record
    #[must_use]
    pub fn data_not_found(uid: &str) -> Self {
        Self::fail(ErrorKind::DataNotFound, format!("`{uid}`: data not found"))
    }

    /// Store operation `op` failed with `cause`
    #[must_use]
    pub fn database_error(op: &str, cause: impl fmt::Display) -> Self {
        Self::fail(
            ErrorKind::DatabaseError,
            format!("`{op}`: execute db exec failed, {cause}"),
        )
    }

    /// No executor registered for `what`
    #[must_use]
    pub fn handler_not_found(what: &str) -> Self {
        Self::fail(
            ErrorKind::HandlerNotFound,
            format!("`{what}`: the handler is not found"),
        )
    }

    /// The executor for a stored record could not be resolved
    #[must_use]
    pub fn handler_exec_not_found(cause: impl fmt::Display) -> Self {
        Self::fail(
            ErrorKind::HandlerExecNotFound,
            format!("cannot execute the experiment, {cause}"),
        )
    }

    /// Required parameter `flag` missing
    #[must_use]
    pub fn parameter_less(flag: &str) -> Self {
        Self::fail(ErrorKind::ParameterLess, format!("less parameter: `{flag}`"))
    }

    /// Parameter `flag` could not be interpreted
    #[must_use]
    pub fn parameter_illegal(flag: &str, reason: impl fmt::Display) -> Self {
        Self::fail(
            ErrorKind::ParameterIllegal,
            format!("illegal `{flag}` parameter value, {reason}"),
        )
    }

    /// Executor `name` has no channel bound
    #[must_use]
    pub fn channel_not_found(name: &str) -> Self {
        Self::fail(
            ErrorKind::ChannelNotFound,
            format!("`{name}`: execution channel is not set"),
        )
    }

    /// `command` ran and failed with `cause`
    #[must_use]
    pub fn exec_command_error(command: &str, cause: impl fmt::Display) -> Self {
        Self::fail(
            ErrorKind::ExecCommandError,
            format!("`{command}`: exec command failed, {cause}"),
        )
    }

    /// Failure category
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.code
    }

    /// Replace the failure message, keeping the code
    #[must_use]
    pub fn with_err(mut self, err: impl Into<String>) -> Self {
        self.err = err.into();
        self
    }

    /// Split into an [`Outcome`] on the success flag
    pub fn into_outcome(self) -> Outcome {
        if self.success {
            Ok(self)
        } else {
            Err(self)
        }
    }

    /// JSON rendering written to stdout
    #[must_use]
    pub fn print(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.to_string())
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            match &self.result {
                Some(Value::String(s)) => f.write_str(s),
                Some(v) => write!(f, "{v}"),
                None => f.write_str("success"),
            }
        } else {
            write!(f, "{} {}", self.code, self.err)
        }
    }
}

impl std::error::Error for Response {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ErrorKind::Ok.code(), 200);
        assert_eq!(ErrorKind::DataNotFound.code(), 47000);
        assert_eq!(ErrorKind::DatabaseError.code(), 51000);
        assert_eq!(ErrorKind::HandlerExecNotFound.code(), 53001);
    }

    #[test]
    fn data_not_found_carries_uid() {
        let resp = Response::data_not_found("abc123");
        assert!(!resp.success);
        assert_eq!(resp.kind(), ErrorKind::DataNotFound);
        assert!(resp.err.contains("abc123"));
    }

    #[test]
    fn into_outcome_splits_on_success() {
        assert!(Response::success("ok").into_outcome().is_ok());
        let err = Response::database_error("query", "disk full")
            .into_outcome()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DatabaseError);
        assert!(err.err.contains("disk full"));
    }

    #[test]
    fn print_omits_empty_fields() {
        let printed = Response::success("done").print();
        assert_eq!(printed, r#"{"code":200,"success":true,"result":"done"}"#);

        let printed = Response::parameter_less("interface").print();
        let value: Value = serde_json::from_str(&printed).unwrap();
        assert_eq!(value["code"], json!(45000));
        assert_eq!(value["success"], json!(false));
        assert!(value.get("result").is_none());
    }

    #[test]
    fn with_err_keeps_code() {
        let resp = Response::exec_command_error("tc", "exit 2").with_err("rewritten");
        assert_eq!(resp.kind(), ErrorKind::ExecCommandError);
        assert_eq!(resp.err, "rewritten");
    }
}
