//! One collection cycle: run listers in order and report into a batch

use std::sync::Arc;

use chrono::Utc;
use pkgagent_pkg::{PackageError, PackageLister};
use pkgagent_report::{Reporter, ReporterBatch};
use tracing::{debug, error, instrument};

use crate::config::CollectionConfig;
use crate::error::CoreError;
use crate::listers::ListerFactory;

/// Collect once for `config`, outside of any schedule
///
/// # Errors
/// Returns `CoreError::Collect` if a supported packaging system fails.
pub async fn collect_once(
    config: &CollectionConfig,
    listers: &dyn ListerFactory,
    reporter: &dyn Reporter,
) -> Result<(), CoreError> {
    let listers = listers.listers_for(config);
    let batch = reporter.start_batch(Utc::now());
    collect_packages(&listers, batch, config.fail_when_unsupported).await
}

/// Run every lister in order, reporting into `batch`
///
/// Unsupported listers are skipped; with `report_when_unsupported` they are
/// reported as failures first. The first lister that fails to list aborts the
/// remaining ones. `batch` is closed exactly once whatever the outcome.
///
/// # Errors
/// Returns `CoreError::Collect` naming the first failing packaging system.
#[instrument(skip_all, fields(listers = listers.len(), report_when_unsupported = report_when_unsupported))]
pub async fn collect_packages(
    listers: &[Arc<dyn PackageLister>],
    mut batch: Box<dyn ReporterBatch>,
    report_when_unsupported: bool,
) -> Result<(), CoreError> {
    let result = report_all(listers, batch.as_mut(), report_when_unsupported).await;

    if let Err(e) = batch.close().await {
        error!(error = %e, "failed to close reporter batch");
    }

    result
}

async fn report_all(
    listers: &[Arc<dyn PackageLister>],
    batch: &mut dyn ReporterBatch,
    report_when_unsupported: bool,
) -> Result<(), CoreError> {
    for lister in listers {
        let system = lister.packaging_system();

        if !lister.is_supported().await {
            debug!(system, "package system not supported on this host");
            if report_when_unsupported {
                batch.report_failure(system, &PackageError::NotSupported(system.to_string()));
            }
            continue;
        }

        match lister.list_packages().await {
            Ok(packages) => {
                debug!(system, count = packages.len(), "collected packages");
                batch.report_success(system, &packages);
            }
            Err(e) => {
                batch.report_failure(system, &e);
                return Err(CoreError::Collect {
                    system: system.to_string(),
                    source: e,
                });
            }
        }
    }

    Ok(())
}
