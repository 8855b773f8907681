//! RPM package lister (Fedora/RHEL/CentOS/SUSE)

use std::sync::Arc;

use pkgagent_exec::CommandExecutor;

use crate::lister::ThreeColumnLister;
use crate::types::PackagingSystem;

/// RPM query executable
pub const RPM: &str = "rpm";

/// `%{evr}` renders `epoch:version-release`, omitting an empty epoch
const QUERY_FORMAT: &str = "%{name} %{evr} %{arch}\\n";

/// Create a lister for RPM packages via `rpm --query --all`
pub fn rpm_lister(executor: Arc<dyn CommandExecutor>) -> ThreeColumnLister {
    ThreeColumnLister::new(
        PackagingSystem::Rpm.as_str(),
        executor,
        RPM,
        vec![
            "--query".to_string(),
            "--all".to_string(),
            "--queryformat".to_string(),
            QUERY_FORMAT.to_string(),
        ],
    )
}
