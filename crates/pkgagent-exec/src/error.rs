//! Error types for pkgagent-exec

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while running a local command
#[derive(Error, Debug, Clone)]
pub enum ExecError {
    /// Process could not be started (not found, not executable, ...)
    #[error("failed to spawn {program}: {message}")]
    SpawnError {
        /// Program that was requested
        program: String,
        /// Underlying OS error
        message: String,
    },

    /// Command timed out
    #[error("command timed out after {timeout:?}")]
    Timeout {
        /// Timeout duration that was exceeded
        timeout: Duration,
    },

    /// I/O error while collecting output
    #[error("I/O error: {0}")]
    IoError(String),
}
