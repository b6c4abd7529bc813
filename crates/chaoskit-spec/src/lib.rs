//! chaoskit spec - shared experiment vocabulary
//!
//! Types every other chaoskit crate speaks:
//! - [`ExpModel`] and [`CommandShape`]: an experiment and its record encoding
//! - [`Response`] / [`ErrorKind`]: the result contract, doubling as an error
//! - [`ExpContext`]: request-scoped destroy flag and identifier
//! - [`Executor`] / [`Channel`]: the apply/reverse capability and its transport
//! - [`ExecutorRegistry`]: lookup of executors by (command, scope, action)
//!
//! # Example
//!
//! ```rust
//! use chaoskit_spec::{CommandShape, ExpModel};
//!
//! let model = ExpModel::new("network", "docker", "delay").with_flag("interface", "eth0");
//! let shape = CommandShape::from_model(&model);
//! assert_eq!(shape.command, "docker");
//! assert_eq!(shape.sub_command, "network delay");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod channel;
pub mod context;
pub mod executor;
pub mod flags;
pub mod model;
pub mod registry;
pub mod response;

pub use channel::{Channel, LocalChannel, DESTROY_ENV, UID_ENV};
pub use context::{ExpContext, UNKNOWN_UID};
pub use executor::{ActionSpec, Executor, FlagSpec};
pub use flags::{decode_flags, encode_flags, FlagError, FlagMap};
pub use model::{CommandShape, ExpModel, DEFAULT_SCOPE, UID_FLAG};
pub use registry::{ExecutorFactory, ExecutorKey, ExecutorRegistry, RegistryError};
pub use response::{ErrorKind, Outcome, Response};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
