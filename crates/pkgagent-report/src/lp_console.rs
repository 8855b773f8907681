//! Line protocol written to a text stream
//!
//! Follows the convention of telegraf's `--test` output: every metric line
//! carries a fixed prefix so a consumer of stdout can pick metric lines out
//! from interleaved logs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pkgagent_pkg::SoftwarePackage;
use tracing::error;

use crate::error::ReportError;
use crate::lineproto::{Metric, failure_metric, package_metrics};
use crate::output::SharedWriter;
use crate::traits::{Reporter, ReporterBatch};

/// Prefix that marks a line as a metric
pub const LINE_PREFIX: &str = "> ";

/// Streams prefixed line protocol, best effort
#[derive(Debug, Clone)]
pub struct LineProtocolConsoleReporter {
    out: SharedWriter,
}

impl LineProtocolConsoleReporter {
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

impl Default for LineProtocolConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for LineProtocolConsoleReporter {
    fn start_batch(&self, timestamp: DateTime<Utc>) -> Box<dyn ReporterBatch> {
        Box::new(LineProtocolConsoleBatch {
            timestamp,
            out: self.out.clone(),
            line: String::new(),
        })
    }
}

struct LineProtocolConsoleBatch {
    timestamp: DateTime<Utc>,
    out: SharedWriter,
    /// Reused line buffer
    line: String,
}

impl LineProtocolConsoleBatch {
    fn write_metric(&mut self, metric: &Metric) {
        let encoded = match metric.encode() {
            Ok(encoded) => encoded,
            Err(e) => {
                error!(error = %e, metric = ?metric, "failed to encode metric");
                return;
            }
        };

        self.line.clear();
        self.line.push_str(LINE_PREFIX);
        self.line.push_str(&encoded);

        if let Err(e) = self.out.write_all(self.line.as_bytes()) {
            error!(error = %e, "failed to write out metric");
        }
    }
}

#[async_trait]
impl ReporterBatch for LineProtocolConsoleBatch {
    fn report_success(&mut self, system: &str, packages: &[SoftwarePackage]) {
        for metric in package_metrics(self.timestamp, system, packages) {
            self.write_metric(&metric);
        }
    }

    fn report_failure(&mut self, system: &str, error: &(dyn std::error::Error + Send + Sync)) {
        let metric = failure_metric(self.timestamp, system, error);
        self.write_metric(&metric);
    }

    async fn close(self: Box<Self>) -> Result<(), ReportError> {
        Ok(())
    }
}
