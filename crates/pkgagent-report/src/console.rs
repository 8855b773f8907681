//! Human-readable console reporter

use std::fmt::Write as _;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pkgagent_pkg::SoftwarePackage;
use tracing::warn;

use crate::error::ReportError;
use crate::output::SharedWriter;
use crate::traits::{Reporter, ReporterBatch};

const BANNER: &str = "============================================================";
const SYSTEM_RULE: &str = "--------------------------------------------------";

/// Prints a table of packages per system for interactive use.
///
/// Failures print nothing; the caller logs them already.
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    out: SharedWriter,
}

impl ConsoleReporter {
    /// Report to standard output
    #[must_use]
    pub fn new() -> Self {
        Self::with_output(SharedWriter::stdout())
    }

    /// Report to the given stream
    #[must_use]
    pub fn with_output(out: SharedWriter) -> Self {
        Self { out }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ConsoleReporter {
    fn start_batch(&self, timestamp: DateTime<Utc>) -> Box<dyn ReporterBatch> {
        let header = format!("{BANNER}\n{}\n", timestamp.format("%d %b %y %H:%M %Z"));
        if let Err(e) = self.out.write_all(header.as_bytes()) {
            warn!(error = %e, "failed to write batch header");
        }

        Box::new(ConsoleBatch {
            out: self.out.clone(),
        })
    }
}

struct ConsoleBatch {
    out: SharedWriter,
}

#[async_trait]
impl ReporterBatch for ConsoleBatch {
    fn report_success(&mut self, system: &str, packages: &[SoftwarePackage]) {
        let mut table = format!("-- {system} {SYSTEM_RULE}\n");
        for p in packages {
            let _ = writeln!(table, "{:<20} {:<25} {}", p.name, p.version, p.arch);
        }

        if let Err(e) = self.out.write_all(table.as_bytes()) {
            warn!(system = %system, error = %e, "failed to write package table");
        }
    }

    fn report_failure(&mut self, _system: &str, _error: &(dyn std::error::Error + Send + Sync)) {}

    async fn close(self: Box<Self>) -> Result<(), ReportError> {
        self.out
            .write_all(format!("{BANNER}\n").as_bytes())
            .map_err(|e| ReportError::Io(e.to_string()))
    }
}
