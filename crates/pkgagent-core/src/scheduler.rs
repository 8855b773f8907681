//! Per-configuration collection loops
//!
//! Each configuration gets its own tokio task. A task waits for a short
//! initial delay, collects once, then collects again on every interval tick
//! until the shared [`CancellationToken`] fires. Tasks share nothing else.
//!
//! Cancellation is only observed between cycles: a cycle that has started
//! always runs to completion, including closing its batch.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use pkgagent_pkg::PackageLister;
use pkgagent_report::Reporter;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::collect::collect_packages;
use crate::config::CollectionConfig;
use crate::listers::ListerFactory;

/// Delay before the first collection of every configuration
pub const INITIAL_COLLECTION_DELAY: Duration = Duration::from_secs(1);

/// Spawns collection loops that all report through one reporter
#[derive(Clone)]
pub struct CollectionScheduler {
    reporter: Arc<dyn Reporter>,
    listers: Arc<dyn ListerFactory>,
    initial_delay: Duration,
}

impl CollectionScheduler {
    pub fn new(reporter: Arc<dyn Reporter>, listers: Arc<dyn ListerFactory>) -> Self {
        Self {
            reporter,
            listers,
            initial_delay: INITIAL_COLLECTION_DELAY,
        }
    }

    #[must_use]
    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    /// Spawn one loop per configuration; handles are in configuration order
    pub fn spawn_all(
        &self,
        configs: Vec<CollectionConfig>,
        cancel: &CancellationToken,
    ) -> Vec<JoinHandle<()>> {
        configs
            .into_iter()
            .enumerate()
            .map(|(index, config)| {
                let span = info_span!("collection", config = index);
                let this = self.clone();
                let cancel = cancel.clone();
                tokio::spawn(async move { this.run(config, cancel).await }.instrument(span))
            })
            .collect()
    }

    /// Spawn the loop for a single configuration
    pub fn spawn(&self, config: CollectionConfig, cancel: CancellationToken) -> JoinHandle<()> {
        let span = info_span!("collection");
        let this = self.clone();
        tokio::spawn(async move { this.run(config, cancel).await }.instrument(span))
    }

    async fn run(self, config: CollectionConfig, cancel: CancellationToken) {
        let listers = self.listers.listers_for(&config);
        let period = config.effective_interval();

        if !config.includes_any() {
            warn!("configuration enables no package systems; batches will be empty");
        }
        info!(
            interval = %humantime::format_duration(period),
            systems = ?listers.iter().map(|l| l.packaging_system()).collect::<Vec<_>>(),
            fail_when_unsupported = config.fail_when_unsupported,
            "scheduled package collection"
        );

        let initial = sleep(self.initial_delay);
        tokio::pin!(initial);
        let mut initial_done = false;

        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    info!("package collection stopped");
                    break;
                }
                () = &mut initial, if !initial_done => {
                    initial_done = true;
                    self.run_cycle(&listers, config.fail_when_unsupported).await;
                }
                _ = ticker.tick() => {
                    self.run_cycle(&listers, config.fail_when_unsupported).await;
                }
            }
        }
    }

    async fn run_cycle(&self, listers: &[Arc<dyn PackageLister>], fail_when_unsupported: bool) {
        let timestamp = Utc::now();
        debug!(%timestamp, "starting collection cycle");

        let batch = self.reporter.start_batch(timestamp);
        if let Err(e) = collect_packages(listers, batch, fail_when_unsupported).await {
            error!(error = %e, "package collection failed");
        }
    }
}
