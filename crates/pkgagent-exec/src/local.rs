//! Local command execution using `tokio::process`

use std::env;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, instrument, warn};

use crate::error::ExecError;
use crate::result::CommandResult;
use crate::traits::CommandExecutor;

/// Local command executor
///
/// Spawns the program directly (no shell) with `tokio::process::Command`.
#[derive(Debug, Clone)]
pub struct LocalExecutor;

impl LocalExecutor {
    /// Create a new local executor
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self), level = "debug")]
    async fn execute(&self, program: &str, args: &[String]) -> Result<CommandResult, ExecError> {
        let start = Instant::now();

        debug!(program = %program, args = ?args, "executing local command");

        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExecError::SpawnError {
                program: program.to_string(),
                message: e.to_string(),
            })?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExecError::IoError(e.to_string()))?;

        let status = output.status.code().unwrap_or(-1);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                program = %program,
                status = status,
                stderr = %stderr.trim_end(),
                "command failed"
            );
        }

        Ok(CommandResult {
            status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            duration: start.elapsed(),
        })
    }
}

impl Default for LocalExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandExecutor for LocalExecutor {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandResult, ExecError> {
        self.execute(program, args).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[String],
        timeout_duration: Duration,
    ) -> Result<CommandResult, ExecError> {
        let start = Instant::now();

        debug!(program = %program, timeout = ?timeout_duration, "executing with timeout");

        match timeout(timeout_duration, self.execute(program, args)).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    program = %program,
                    timeout = ?timeout_duration,
                    elapsed = ?start.elapsed(),
                    "command timed out"
                );
                Err(ExecError::Timeout {
                    timeout: timeout_duration,
                })
            }
        }
    }

    async fn is_available(&self, program: &str) -> bool {
        find_program(program).is_some()
    }

    fn executor_type(&self) -> &'static str {
        "local"
    }
}

/// Resolve `program` the way a shell would, against the current `PATH`.
///
/// Names containing a path separator are checked as-is. The lookup is
/// repeated on every call since executables come and go between cycles.
#[must_use]
pub fn find_program(program: &str) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }

    if program.contains(std::path::MAIN_SEPARATOR) {
        let path = PathBuf::from(program);
        return is_executable(&path).then_some(path);
    }

    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
