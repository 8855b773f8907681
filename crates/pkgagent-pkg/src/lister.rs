//! Generic lister for package managers that print three columns

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pkgagent_exec::CommandExecutor;
use tracing::{debug, info, instrument};

use crate::error::PackageError;
use crate::traits::PackageLister;
use crate::types::SoftwarePackage;

/// Lister for any query command whose arguments force an output format of
/// `name version arch`, one installed package per line.
pub struct ThreeColumnLister {
    packaging_system: String,
    executor: Arc<dyn CommandExecutor>,
    command_name: String,
    command_args: Vec<String>,
    /// Optional bound on how long the query may run
    timeout: Option<Duration>,
}

impl ThreeColumnLister {
    /// Create a lister for `packaging_system` that runs `command_name` with
    /// `command_args` through `executor`
    pub fn new(
        packaging_system: impl Into<String>,
        executor: Arc<dyn CommandExecutor>,
        command_name: impl Into<String>,
        command_args: Vec<String>,
    ) -> Self {
        Self {
            packaging_system: packaging_system.into(),
            executor,
            command_name: command_name.into(),
            command_args,
            timeout: None,
        }
    }

    /// Bound the query command's run time
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Executable this lister invokes
    #[must_use]
    pub fn command_name(&self) -> &str {
        &self.command_name
    }

    /// Arguments passed to the executable
    #[must_use]
    pub fn command_args(&self) -> &[String] {
        &self.command_args
    }
}

impl std::fmt::Debug for ThreeColumnLister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreeColumnLister")
            .field("packaging_system", &self.packaging_system)
            .field("executor", &self.executor.executor_type())
            .field("command_name", &self.command_name)
            .field("command_args", &self.command_args)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl PackageLister for ThreeColumnLister {
    fn packaging_system(&self) -> &str {
        &self.packaging_system
    }

    async fn is_supported(&self) -> bool {
        self.executor.is_available(&self.command_name).await
    }

    #[instrument(skip(self), fields(system = %self.packaging_system))]
    async fn list_packages(&self) -> Result<Vec<SoftwarePackage>, PackageError> {
        debug!(
            name = %self.command_name,
            args = ?self.command_args,
            "calling packaging tool"
        );

        let result = match self.timeout {
            Some(timeout) => {
                self.executor
                    .run_with_timeout(&self.command_name, &self.command_args, timeout)
                    .await?
            }
            None => {
                self.executor
                    .run(&self.command_name, &self.command_args)
                    .await?
            }
        };

        debug!(
            status = result.status,
            duration = ?result.duration,
            "packaging tool finished"
        );

        if !result.success() {
            return Err(PackageError::CommandFailed {
                status: result.status,
            });
        }

        let packages = parse_three_columns(&result.stdout)?;
        info!(count = packages.len(), "listed installed packages");

        Ok(packages)
    }
}

/// Parse `name version arch` lines.
///
/// Only the first two whitespace runs separate columns; the architecture is
/// the remainder of the line. Any line with fewer than three columns aborts
/// the whole parse since a partial listing can't be trusted.
///
/// # Errors
/// Returns `PackageError::MalformedOutput` naming the first bad line.
pub fn parse_three_columns(output: &str) -> Result<Vec<SoftwarePackage>, PackageError> {
    output
        .lines()
        .map(|line| {
            split_columns(line)
                .map(|(name, version, arch)| SoftwarePackage::new(name, version, arch))
                .ok_or_else(|| PackageError::MalformedOutput {
                    line: line.to_string(),
                })
        })
        .collect()
}

fn split_columns(line: &str) -> Option<(&str, &str, &str)> {
    let (name, rest) = line.split_once(char::is_whitespace)?;
    let rest = rest.trim_start();
    let (version, arch) = rest.split_once(char::is_whitespace)?;
    let arch = arch.trim();

    if name.is_empty() || version.is_empty() || arch.is_empty() {
        return None;
    }

    Some((name, version, arch))
}
