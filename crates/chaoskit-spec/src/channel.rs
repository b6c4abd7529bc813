//! Execution channels
//!
//! A channel decides where an executor's command physically runs. Only the
//! local shell channel lives here; container and cluster channels are
//! provided by backends implementing [`Channel`].

use crate::context::ExpContext;
use crate::response::Response;
use tokio::process::Command;

/// Environment variable telling spawned commands whether to reverse a fault
pub const DESTROY_ENV: &str = "CHAOSKIT_DESTROY";

/// Environment variable carrying the experiment identifier
pub const UID_ENV: &str = "CHAOSKIT_UID";

/// Transport for executor commands
#[async_trait::async_trait]
pub trait Channel: Send + Sync + std::fmt::Debug {
    /// Channel name for diagnostics
    fn name(&self) -> &str;

    /// Run `script` and report the outcome.
    ///
    /// The destroy mode and identifier of `ctx` must be visible to the
    /// command. No timeout is applied at this layer unless the channel
    /// defines one.
    async fn run(&self, ctx: &ExpContext, script: &str) -> Response;
}

/// Runs commands through `sh -c` on the local host
#[derive(Debug, Clone)]
pub struct LocalChannel {
    shell: String,
}

impl LocalChannel {
    /// Channel using `/bin/sh`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_shell("sh")
    }

    /// Channel using a specific shell binary
    #[must_use]
    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for LocalChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Channel for LocalChannel {
    fn name(&self) -> &str {
        "local"
    }

    async fn run(&self, ctx: &ExpContext, script: &str) -> Response {
        let uid = ctx
            .destroy_uid()
            .or_else(|| ctx.uid())
            .unwrap_or_default();
        tracing::debug!(script, uid, destroy = ctx.is_destroy(), "local channel run");

        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(script)
            .env(DESTROY_ENV, ctx.is_destroy().to_string())
            .env(UID_ENV, uid)
            .output()
            .await;

        match output {
            Ok(out) if out.status.success() => {
                Response::success(String::from_utf8_lossy(&out.stdout).trim().to_string())
            }
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
                let cause = if stderr.is_empty() {
                    out.status.to_string()
                } else {
                    stderr
                };
                Response::exec_command_error(script, cause)
            }
            Err(e) => Response::exec_command_error(script, e),
        }
    }
}
