//! Line protocol delivered to a TCP socket listener (e.g. telegraf's
//! `socket_listener` input)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pkgagent_pkg::SoftwarePackage;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::error::{ReportError, SenderError};
use crate::lineproto::{Metric, failure_metric, package_metrics};
use crate::sender::{LineProtocolSender, SenderConfig};
use crate::traits::{Reporter, ReporterBatch};

/// Hands metrics to a buffered [`LineProtocolSender`]; closing a batch
/// forces a flush
#[derive(Debug, Clone)]
pub struct LineProtocolSocketReporter {
    sender: LineProtocolSender,
}

impl LineProtocolSocketReporter {
    /// Start a sender bound to `endpoint` with default batching. Delivery
    /// failures are logged.
    ///
    /// The returned handle completes once `cancel` fires and the final
    /// flush is done.
    ///
    /// # Errors
    /// Returns `SenderError::InvalidEndpoint` if `endpoint` is not `host:port`.
    pub fn new(
        endpoint: &str,
        cancel: CancellationToken,
    ) -> Result<(Self, JoinHandle<()>), SenderError> {
        let logged_endpoint = endpoint.to_string();
        let config = SenderConfig::new(endpoint).with_error_listener(move |e| {
            error!(
                error = %e,
                endpoint = %logged_endpoint,
                "failed to send line protocol metrics"
            );
        });

        Self::with_config(config, cancel)
    }

    /// Start a sender with explicit settings
    ///
    /// # Errors
    /// Returns `SenderError::InvalidEndpoint` if the endpoint is not `host:port`.
    pub fn with_config(
        config: SenderConfig,
        cancel: CancellationToken,
    ) -> Result<(Self, JoinHandle<()>), SenderError> {
        let (sender, handle) = LineProtocolSender::spawn(config, cancel)?;
        Ok((Self { sender }, handle))
    }
}

impl Reporter for LineProtocolSocketReporter {
    fn start_batch(&self, timestamp: DateTime<Utc>) -> Box<dyn ReporterBatch> {
        Box::new(LineProtocolSocketBatch {
            timestamp,
            sender: self.sender.clone(),
        })
    }
}

struct LineProtocolSocketBatch {
    timestamp: DateTime<Utc>,
    sender: LineProtocolSender,
}

impl LineProtocolSocketBatch {
    fn send(&self, metric: &Metric) {
        let line = match metric.encode() {
            Ok(line) => line,
            Err(e) => {
                error!(error = %e, metric = ?metric, "failed to encode metric");
                return;
            }
        };

        if let Err(e) = self.sender.send(line) {
            error!(error = %e, endpoint = %self.sender.endpoint(), "failed to enqueue metric");
        }
    }
}

#[async_trait]
impl ReporterBatch for LineProtocolSocketBatch {
    fn report_success(&mut self, system: &str, packages: &[SoftwarePackage]) {
        for metric in package_metrics(self.timestamp, system, packages) {
            self.send(&metric);
        }
    }

    fn report_failure(&mut self, system: &str, error: &(dyn std::error::Error + Send + Sync)) {
        self.send(&failure_metric(self.timestamp, system, error));
    }

    async fn close(self: Box<Self>) -> Result<(), ReportError> {
        self.sender.flush().await?;
        Ok(())
    }
}
