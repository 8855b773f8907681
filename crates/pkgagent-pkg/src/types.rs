//! Type definitions for package listing

/// An installed software package as reported by a package manager
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SoftwarePackage {
    /// Package name
    pub name: String,
    /// Manager-specific version string, may include epoch and release
    pub version: String,
    /// CPU architecture (`x86_64`, `amd64`, `noarch`, ...)
    pub arch: String,
}

impl SoftwarePackage {
    /// Create a new package record
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        arch: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            arch: arch.into(),
        }
    }
}

/// Packaging systems with a built-in lister
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackagingSystem {
    /// dpkg (Debian/Ubuntu)
    Debian,
    /// RPM (Fedora/RHEL/SUSE)
    Rpm,
}

impl PackagingSystem {
    /// Stable identifier used in tags and log fields
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PackagingSystem::Debian => "debian",
            PackagingSystem::Rpm => "rpm",
        }
    }
}

impl std::fmt::Display for PackagingSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
