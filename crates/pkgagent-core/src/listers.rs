//! Building the lister set for a configuration

use std::sync::Arc;

use pkgagent_exec::CommandExecutor;
use pkgagent_pkg::{PackageLister, debian_lister, rpm_lister};

use crate::config::CollectionConfig;

/// Factory for the listers a configuration enables
///
/// Swapped out in tests to inject scripted listers.
pub trait ListerFactory: Send + Sync {
    /// Listers for `config`, in collection order
    fn listers_for(&self, config: &CollectionConfig) -> Vec<Arc<dyn PackageLister>>;
}

/// Real dpkg and rpm listers running through one executor
pub struct DefaultListerFactory {
    executor: Arc<dyn CommandExecutor>,
}

impl DefaultListerFactory {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self { executor }
    }
}

impl ListerFactory for DefaultListerFactory {
    /// Debian is always ordered before RPM
    fn listers_for(&self, config: &CollectionConfig) -> Vec<Arc<dyn PackageLister>> {
        let mut listers: Vec<Arc<dyn PackageLister>> = Vec::new();

        if config.include_debian {
            listers.push(Arc::new(
                debian_lister(Arc::clone(&self.executor)).with_timeout(config.command_timeout),
            ));
        }
        if config.include_rpm {
            listers.push(Arc::new(
                rpm_lister(Arc::clone(&self.executor)).with_timeout(config.command_timeout),
            ));
        }

        listers
    }
}
