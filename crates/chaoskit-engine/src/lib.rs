//! chaoskit engine - experiment lifecycle
//!
//! Creates experiments, reverses them by uid or by matching flags, and
//! answers status queries. Executors come from an [`ExecutorRegistry`]
//! built from configuration; records live in any [`RecordStore`].
//!
//! # Example
//!
//! ```rust,ignore
//! use chaoskit_engine::{ChaosConfig, ExperimentEngine};
//! use chaoskit_spec::ExpContext;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ChaosConfig::load("chaoskit.toml")?;
//! let engine = ExperimentEngine::new(config.open_store()?, Arc::new(config.build_registry()?));
//!
//! match engine.destroy_by_uid(&ExpContext::new(), "47cc0744f1bb", false).await {
//!     Ok(resp) => println!("{}", resp.print()),
//!     Err(resp) => eprintln!("{}", resp.print()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`ExecutorRegistry`]: chaoskit_spec::ExecutorRegistry
//! [`RecordStore`]: chaoskit_store::RecordStore

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod create;
pub mod destroy;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod reconstruct;
pub mod shell;
pub mod status;

pub use config::{
    ChaosConfig, ExecutorConfig, LogConfig, StoreConfig, MEMORY_STORE, RESERVED_COMMANDS, RESERVED_FLAGS,
};
pub use create::{new_uid, UID_LEN};
pub use destroy::{compose_force_remove, destroyed_summary};
pub use engine::ExperimentEngine;
pub use error::{ConfigError, ReconstructError};
pub use reconstruct::reconstruct;
pub use shell::ShellExecutor;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the engine
    pub use crate::{ChaosConfig, ExperimentEngine};
    pub use chaoskit_spec::{ExpContext, ExpModel, Outcome, Response};
    pub use chaoskit_store::{ExperimentStatus, RecordStore};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
