//! Building the reporter the agent reports through

use std::sync::Arc;

use eyre::{Result, WrapErr};
use pkgagent_report::{
    ConsoleReporter, LineProtocolConsoleReporter, LineProtocolSocketReporter, Reporter,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::cli::Sink;

/// The selected reporter, plus the background sender when reporting to a
/// socket
pub struct ReportingSink {
    reporter: Arc<dyn Reporter>,
    sender: Option<(CancellationToken, JoinHandle<()>)>,
}

impl ReportingSink {
    /// Create the reporter for `sink`
    ///
    /// # Errors
    /// Returns error if the socket endpoint is not `host:port`
    pub fn new(sink: &Sink) -> Result<Self> {
        let sink = match sink {
            Sink::Console => Self {
                reporter: Arc::new(ConsoleReporter::new()),
                sender: None,
            },
            Sink::LineProtocolConsole => Self {
                reporter: Arc::new(LineProtocolConsoleReporter::new()),
                sender: None,
            },
            Sink::LineProtocolSocket(endpoint) => {
                let cancel = CancellationToken::new();
                let (reporter, handle) =
                    LineProtocolSocketReporter::new(endpoint, cancel.clone())
                        .wrap_err("failed to create line protocol sender")?;
                info!(endpoint = %endpoint, "reporting line protocol to socket");
                Self {
                    reporter: Arc::new(reporter),
                    sender: Some((cancel, handle)),
                }
            }
        };

        Ok(sink)
    }

    pub fn reporter(&self) -> Arc<dyn Reporter> {
        Arc::clone(&self.reporter)
    }

    /// Stop the socket sender after its final flush
    pub async fn shutdown(self) {
        if let Some((cancel, handle)) = self.sender {
            cancel.cancel();
            if let Err(e) = handle.await {
                error!(error = %e, "line protocol sender task failed");
            }
        }
    }
}
