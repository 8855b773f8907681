//! Reporter and batch traits

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pkgagent_pkg::SoftwarePackage;

use crate::error::ReportError;

/// A sink for package inventories.
///
/// Each collection cycle gets its own [`ReporterBatch`].
pub trait Reporter: Send + Sync {
    /// Open the reporting session for one collection cycle
    fn start_batch(&self, timestamp: DateTime<Utc>) -> Box<dyn ReporterBatch>;
}

/// Output session for a single collection cycle.
///
/// Reports may arrive in any order. `close` consumes the batch, so it runs
/// at most once; callers are responsible for making sure it runs at all.
/// Delivery problems are logged by the batch itself and never returned from
/// the report methods.
#[async_trait]
pub trait ReporterBatch: Send {
    /// Report the full package listing for `system`
    fn report_success(&mut self, system: &str, packages: &[SoftwarePackage]);

    /// Report that listing `system` failed
    fn report_failure(&mut self, system: &str, error: &(dyn std::error::Error + Send + Sync));

    /// Finish the batch, flushing anything still buffered
    async fn close(self: Box<Self>) -> Result<(), ReportError>;
}
