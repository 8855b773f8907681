//! Core error types for pkgagent-core

use std::path::PathBuf;

use pkgagent_pkg::PackageError;
use thiserror::Error;

/// Errors loading collection configurations
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configs directory missing, not a directory, or unreadable
    #[error("failed to walk configs directory {}: {source}", .path.display())]
    ReadDir {
        /// Directory that was walked
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be read
    #[error("failed to open config file {name}: {source}")]
    Read {
        /// File name within the configs directory
        name: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not a valid configuration record
    #[error("failed to decode config file {name}: {source}")]
    Decode {
        /// File name within the configs directory
        name: String,
        /// JSON decoding error
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that can occur in collection
#[derive(Error, Debug)]
pub enum CoreError {
    /// A supported package system failed to list its packages
    #[error("failed to collect {system} packages: {source}")]
    Collect {
        /// Packaging system that failed
        system: String,
        /// Lister failure
        #[source]
        source: PackageError,
    },
}
