//! pkgagent-core: Collection orchestration and scheduling
//!
//! Runs listers against a reporter batch, loads collection configurations,
//! and drives one timed collection loop per configuration.

pub mod collect;
pub mod config;
pub mod error;
pub mod listers;
pub mod scheduler;

pub use collect::{collect_once, collect_packages};
pub use config::{CollectionConfig, DEFAULT_INTERVAL, load_configs};
pub use error::{ConfigError, CoreError};
pub use listers::{DefaultListerFactory, ListerFactory};
pub use scheduler::{CollectionScheduler, INITIAL_COLLECTION_DELAY};
