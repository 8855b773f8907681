//! Result types for command execution

use std::time::Duration;

/// Result of a command execution
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit status code (0 for success, -1 when killed by a signal)
    pub status: i32,
    /// stdout output
    pub stdout: String,
    /// Time taken to execute
    pub duration: Duration,
}

impl CommandResult {
    /// Build a result without timing information
    pub fn new(status: i32, stdout: impl Into<String>) -> Self {
        Self {
            status,
            stdout: stdout.into(),
            duration: Duration::ZERO,
        }
    }

    /// Check if command succeeded (exit code 0)
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == 0
    }
}
