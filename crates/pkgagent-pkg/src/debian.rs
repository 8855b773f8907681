//! dpkg package lister (Debian/Ubuntu)

use std::sync::Arc;

use pkgagent_exec::CommandExecutor;

use crate::lister::ThreeColumnLister;
use crate::types::PackagingSystem;

/// Query tool shipped with dpkg
pub const DPKG_QUERY: &str = "dpkg-query";

/// Output format giving `name version arch` per package
const SHOW_FORMAT: &str = "${Package} ${Version} ${Architecture}\\n";

/// Create a lister for Debian packages via `dpkg-query --show`
pub fn debian_lister(executor: Arc<dyn CommandExecutor>) -> ThreeColumnLister {
    ThreeColumnLister::new(
        PackagingSystem::Debian.as_str(),
        executor,
        DPKG_QUERY,
        vec![
            "--show".to_string(),
            "--showformat".to_string(),
            SHOW_FORMAT.to_string(),
        ],
    )
}
