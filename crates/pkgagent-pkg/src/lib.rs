//! pkgagent-pkg: Package lister abstraction
//!
//! Provides the lister trait and the dpkg and rpm implementations, both built
//! on one generic three-column output parser.

pub mod debian;
pub mod error;
pub mod lister;
pub mod rpm;
pub mod traits;
pub mod types;

pub use debian::debian_lister;
pub use error::PackageError;
pub use lister::{ThreeColumnLister, parse_three_columns};
pub use rpm::rpm_lister;
pub use traits::PackageLister;
pub use types::{PackagingSystem, SoftwarePackage};
