//! Collection configuration records and loading them from a directory

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;

/// Interval used when a configuration leaves it out or sets it to zero
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// One independently scheduled collection policy
///
/// ```json
/// {"interval": "6h", "include-debian": true, "fail-when-not-supported": true}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CollectionConfig {
    /// Time between collections, e.g. `"6h"` or `"1h 30m"`
    #[serde(default, with = "humantime_serde")]
    pub interval: Duration,
    /// List RPM packages
    #[serde(default)]
    pub include_rpm: bool,
    /// List Debian packages
    #[serde(default)]
    pub include_debian: bool,
    /// Report an included but unsupported package system as a failure
    #[serde(default, rename = "fail-when-not-supported")]
    pub fail_when_unsupported: bool,
    /// Bound on each package manager invocation; unbounded when absent
    #[serde(
        default,
        with = "humantime_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub command_timeout: Option<Duration>,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            include_rpm: false,
            include_debian: false,
            fail_when_unsupported: false,
            command_timeout: None,
        }
    }
}

impl CollectionConfig {
    /// Interval to schedule with, substituting the default for zero
    #[must_use]
    pub fn effective_interval(&self) -> Duration {
        if self.interval.is_zero() {
            DEFAULT_INTERVAL
        } else {
            self.interval
        }
    }

    /// Whether any package system is enabled
    #[must_use]
    pub fn includes_any(&self) -> bool {
        self.include_debian || self.include_rpm
    }

    fn with_defaults(mut self) -> Self {
        self.interval = self.effective_interval();
        self
    }
}

/// Load every `*.json` regular file in `dir`, in file name order
///
/// # Errors
/// Returns `ConfigError` if the directory cannot be walked or any config
/// file cannot be read or decoded.
pub fn load_configs(dir: &Path) -> Result<Vec<CollectionConfig>, ConfigError> {
    let walk_err = |source| ConfigError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(walk_err)? {
        let entry = entry.map_err(walk_err)?;
        let file_type = entry.file_type().map_err(walk_err)?;
        let name = entry.file_name().to_string_lossy().into_owned();

        if file_type.is_file() && name.ends_with(".json") {
            names.push(name);
        } else {
            debug!(name = %name, "skipping non-config entry");
        }
    }
    names.sort();

    let configs = names
        .iter()
        .map(|name| load_config_file(dir, name))
        .collect::<Result<Vec<_>, _>>()?;

    info!(dir = %dir.display(), count = configs.len(), "loaded collection configs");
    Ok(configs)
}

fn load_config_file(dir: &Path, name: &str) -> Result<CollectionConfig, ConfigError> {
    let content = fs::read_to_string(dir.join(name)).map_err(|source| ConfigError::Read {
        name: name.to_string(),
        source,
    })?;

    let config: CollectionConfig =
        serde_json::from_str(&content).map_err(|source| ConfigError::Decode {
            name: name.to_string(),
            source,
        })?;

    Ok(config.with_defaults())
}
