//! Error types for pkgagent-pkg

use pkgagent_exec::ExecError;
use thiserror::Error;

/// Errors that can occur while listing installed packages
#[derive(Error, Debug, Clone)]
pub enum PackageError {
    /// Package manager executable is not resolvable on this host
    #[error("package system {0} is not supported")]
    NotSupported(String),

    /// Package manager exited with a nonzero status
    #[error("failed to run package manager: exit status {status}")]
    CommandFailed {
        /// Exit status
        status: i32,
    },

    /// A line of output did not contain name, version and architecture
    #[error("package manager output line was malformed: {line}")]
    MalformedOutput {
        /// The offending line, verbatim
        line: String,
    },

    /// Package manager could not be run at all
    #[error("failed to run package manager: {0}")]
    Execution(#[from] ExecError),
}
