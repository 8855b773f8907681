//! Command executor trait

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ExecError;
use crate::result::CommandResult;

/// Runs an external program by name with a fixed argument list.
///
/// Package listers only ever talk to this trait, so tests can swap in a
/// deterministic fake instead of spawning real package managers.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run `program` with `args`, capturing stdout.
    ///
    /// A nonzero exit status is not an error at this level; inspect
    /// [`CommandResult::status`].
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandResult, ExecError>;

    /// Same as [`CommandExecutor::run`] but gives up after `timeout`.
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandResult, ExecError>;

    /// Whether `program` can currently be resolved for execution
    async fn is_available(&self, program: &str) -> bool;

    /// Get executor type name
    fn executor_type(&self) -> &'static str;
}
