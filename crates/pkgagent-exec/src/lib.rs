//! pkgagent-exec: Command execution abstraction
//!
//! Provides the trait package listers run commands through, plus the local
//! process-spawning implementation.

pub mod error;
pub mod local;
pub mod result;
pub mod traits;

pub use error::ExecError;
pub use local::{LocalExecutor, find_program};
pub use result::CommandResult;
pub use traits::CommandExecutor;
