//! Package lister trait

use async_trait::async_trait;

use crate::error::PackageError;
use crate::types::SoftwarePackage;

/// Queries one package manager for the full set of installed packages.
///
/// Implementations hold no state between calls. Callers must check
/// [`PackageLister::is_supported`] before every listing, since the
/// underlying executable may appear or disappear between cycles.
#[async_trait]
pub trait PackageLister: Send + Sync {
    /// Stable identifier of the packaging system, e.g. `"debian"` or `"rpm"`
    fn packaging_system(&self) -> &str;

    /// Whether the package manager executable is resolvable right now
    async fn is_supported(&self) -> bool;

    /// List every installed package, or fail without a partial result
    async fn list_packages(&self) -> Result<Vec<SoftwarePackage>, PackageError>;
}
