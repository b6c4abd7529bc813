//! chaoskit store - persisted experiment records
//!
//! The store is the only shared mutable state of chaoskit. It holds one
//! [`ExperimentRecord`] per experiment uid with the command the experiment was
//! created with and its lifecycle [`ExperimentStatus`].
//!
//! # Backends
//!
//! - [`SqliteStore`]: the on-disk store used by `chaosctl`
//! - [`MemoryStore`]: process-local, for tests and `":memory:"` configs

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod memory;
pub mod record;
pub mod sqlite;
pub mod status;
pub mod store;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use record::ExperimentRecord;
pub use sqlite::SqliteStore;
pub use status::{allowed_transitions, validate_transition, ExperimentStatus, TransitionError};
pub use store::RecordStore;
