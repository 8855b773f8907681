#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use pkgagent_core::{CollectionConfig, ListerFactory};
use pkgagent_pkg::{PackageError, PackageLister, SoftwarePackage};
use pkgagent_report::{ReportError, Reporter, ReporterBatch};

// Mock implementations
pub struct ScriptedLister {
    system: String,
    supported: bool,
    outcome: Result<Vec<SoftwarePackage>, PackageError>,
    list_calls: AtomicUsize,
}

impl ScriptedLister {
    pub fn succeeding(system: &str, packages: Vec<SoftwarePackage>) -> Arc<Self> {
        Arc::new(Self {
            system: system.to_string(),
            supported: true,
            outcome: Ok(packages),
            list_calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(system: &str, error: PackageError) -> Arc<Self> {
        Arc::new(Self {
            system: system.to_string(),
            supported: true,
            outcome: Err(error),
            list_calls: AtomicUsize::new(0),
        })
    }

    pub fn unsupported(system: &str) -> Arc<Self> {
        Arc::new(Self {
            system: system.to_string(),
            supported: false,
            outcome: Ok(Vec::new()),
            list_calls: AtomicUsize::new(0),
        })
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PackageLister for ScriptedLister {
    fn packaging_system(&self) -> &str {
        &self.system
    }

    async fn is_supported(&self) -> bool {
        self.supported
    }

    async fn list_packages(&self) -> Result<Vec<SoftwarePackage>, PackageError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Hands out the same listers for every configuration
pub struct StaticListerFactory(pub Vec<Arc<dyn PackageLister>>);

impl ListerFactory for StaticListerFactory {
    fn listers_for(&self, _config: &CollectionConfig) -> Vec<Arc<dyn PackageLister>> {
        self.0.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start,
    Success { system: String, packages: usize },
    Failure { system: String, message: String },
    Close,
}

/// Records every call made against it and its batches
#[derive(Default)]
pub struct RecordingReporter {
    events: Arc<Mutex<Vec<Event>>>,
    fail_close: bool,
}

impl RecordingReporter {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_close() -> Arc<Self> {
        Arc::new(Self {
            events: Arc::default(),
            fail_close: true,
        })
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, event: &Event) -> usize {
        self.events().iter().filter(|e| *e == event).count()
    }

    pub fn batch(&self) -> Box<dyn ReporterBatch> {
        self.start_batch(Utc::now())
    }
}

impl Reporter for RecordingReporter {
    fn start_batch(&self, _timestamp: DateTime<Utc>) -> Box<dyn ReporterBatch> {
        self.events.lock().unwrap().push(Event::Start);
        Box::new(RecordingBatch {
            events: Arc::clone(&self.events),
            fail_close: self.fail_close,
        })
    }
}

struct RecordingBatch {
    events: Arc<Mutex<Vec<Event>>>,
    fail_close: bool,
}

#[async_trait]
impl ReporterBatch for RecordingBatch {
    fn report_success(&mut self, system: &str, packages: &[SoftwarePackage]) {
        self.events.lock().unwrap().push(Event::Success {
            system: system.to_string(),
            packages: packages.len(),
        });
    }

    fn report_failure(&mut self, system: &str, error: &(dyn std::error::Error + Send + Sync)) {
        self.events.lock().unwrap().push(Event::Failure {
            system: system.to_string(),
            message: error.to_string(),
        });
    }

    async fn close(self: Box<Self>) -> Result<(), ReportError> {
        self.events.lock().unwrap().push(Event::Close);
        if self.fail_close {
            return Err(ReportError::Io("sink went away".to_string()));
        }
        Ok(())
    }
}

pub fn packages(names: &[&str]) -> Vec<SoftwarePackage> {
    names
        .iter()
        .map(|name| SoftwarePackage::new(*name, "1.0", "x86_64"))
        .collect()
}
