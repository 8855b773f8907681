//! Buffered line protocol sender over TCP
//!
//! A background task owns the connection and the buffer. Callers only
//! enqueue, so sending never blocks on the network. The buffer is written
//! out when it reaches `batch_size`, when `batch_timeout` has passed since
//! the first buffered line, or when [`LineProtocolSender::flush`] asks for
//! it. Delivery failures go to the configured error listener; the lines in
//! a failed write are dropped and the next write reconnects.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::error::SenderError;

/// Maximum number of lines held before a write is forced
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Longest a line waits in the buffer
pub const DEFAULT_BATCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Callback invoked from the sender task on every delivery failure
pub type ErrorListener = Arc<dyn Fn(&SenderError) + Send + Sync>;

/// Sender settings
#[derive(Clone)]
pub struct SenderConfig {
    /// `host:port` of a line protocol TCP listener
    pub endpoint: String,
    /// Maximum lines per write
    pub batch_size: usize,
    /// Maximum time a line is buffered
    pub batch_timeout: Duration,
    /// Receives send and flush failures
    pub error_listener: Option<ErrorListener>,
}

impl SenderConfig {
    /// Settings for `endpoint` with the default batching
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            batch_timeout: DEFAULT_BATCH_TIMEOUT,
            error_listener: None,
        }
    }

    /// Set maximum lines per write
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Set maximum buffering time
    #[must_use]
    pub fn with_batch_timeout(mut self, batch_timeout: Duration) -> Self {
        self.batch_timeout = batch_timeout;
        self
    }

    /// Set the failure callback
    #[must_use]
    pub fn with_error_listener(
        mut self,
        listener: impl Fn(&SenderError) + Send + Sync + 'static,
    ) -> Self {
        self.error_listener = Some(Arc::new(listener));
        self
    }
}

impl std::fmt::Debug for SenderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SenderConfig")
            .field("endpoint", &self.endpoint)
            .field("batch_size", &self.batch_size)
            .field("batch_timeout", &self.batch_timeout)
            .field("error_listener", &self.error_listener.is_some())
            .finish()
    }
}

enum Command {
    Line(String),
    Flush(oneshot::Sender<()>),
}

/// Handle to the sender task. Cheap to clone and safe to share.
#[derive(Debug, Clone)]
pub struct LineProtocolSender {
    tx: mpsc::UnboundedSender<Command>,
    endpoint: String,
}

impl LineProtocolSender {
    /// Validate the endpoint and start the sender task.
    ///
    /// The connection is made on first write, so the listener does not have
    /// to be up yet. The task stops after a final flush when `cancel` fires
    /// or every handle is dropped.
    ///
    /// # Errors
    /// Returns `SenderError::InvalidEndpoint` if `endpoint` is not `host:port`.
    pub fn spawn(
        config: SenderConfig,
        cancel: CancellationToken,
    ) -> Result<(Self, JoinHandle<()>), SenderError> {
        validate_endpoint(&config.endpoint)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let endpoint = config.endpoint.clone();
        let task = SenderTask {
            config,
            buffer: Vec::new(),
            deadline: None,
            stream: None,
        };
        let handle = tokio::spawn(task.run(rx, cancel));

        Ok((Self { tx, endpoint }, handle))
    }

    /// Endpoint this sender writes to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Enqueue one encoded line (including its trailing newline)
    ///
    /// # Errors
    /// Returns `SenderError::Closed` if the sender task has stopped.
    pub fn send(&self, line: String) -> Result<(), SenderError> {
        self.tx
            .send(Command::Line(line))
            .map_err(|_| SenderError::Closed)
    }

    /// Write out everything enqueued so far and wait for the attempt.
    ///
    /// Write failures are reported to the error listener, not here.
    ///
    /// # Errors
    /// Returns `SenderError::Closed` if the sender task has stopped.
    pub async fn flush(&self) -> Result<(), SenderError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(Command::Flush(ack_tx))
            .map_err(|_| SenderError::Closed)?;
        ack_rx.await.map_err(|_| SenderError::Closed)
    }
}

fn validate_endpoint(endpoint: &str) -> Result<(), SenderError> {
    let valid = endpoint
        .rsplit_once(':')
        .is_some_and(|(host, port)| !host.is_empty() && port.parse::<u16>().is_ok());

    if valid {
        Ok(())
    } else {
        Err(SenderError::InvalidEndpoint(endpoint.to_string()))
    }
}

struct SenderTask {
    config: SenderConfig,
    buffer: Vec<String>,
    /// When the oldest buffered line must be written
    deadline: Option<Instant>,
    stream: Option<TcpStream>,
}

impl SenderTask {
    #[instrument(skip_all, fields(endpoint = %self.config.endpoint))]
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>, cancel: CancellationToken) {
        debug!("line protocol sender started");

        loop {
            let deadline = self.deadline;
            let timer = async move {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    self.drain(&mut rx).await;
                    break;
                }
                command = rx.recv() => match command {
                    Some(command) => self.handle(command).await,
                    None => {
                        self.flush().await;
                        break;
                    }
                },
                () = timer => self.flush().await,
            }
        }

        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
        }
        info!("line protocol sender stopped");
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Line(line) => {
                if self.buffer.is_empty() {
                    self.deadline = Some(Instant::now() + self.config.batch_timeout);
                }
                self.buffer.push(line);
                if self.buffer.len() >= self.config.batch_size {
                    self.flush().await;
                }
            }
            Command::Flush(ack) => {
                self.flush().await;
                let _ = ack.send(());
            }
        }
    }

    /// Take whatever is already queued, write it once, then release waiters
    async fn drain(&mut self, rx: &mut mpsc::UnboundedReceiver<Command>) {
        let mut acks = Vec::new();
        while let Ok(command) = rx.try_recv() {
            match command {
                Command::Line(line) => self.buffer.push(line),
                Command::Flush(ack) => acks.push(ack),
            }
        }

        self.flush().await;
        for ack in acks {
            let _ = ack.send(());
        }
    }

    async fn flush(&mut self) {
        self.deadline = None;
        if self.buffer.is_empty() {
            return;
        }

        let lines = std::mem::take(&mut self.buffer);
        let count = lines.len();
        let payload = lines.concat();

        if let Err(e) = self.write(payload.as_bytes(), count).await {
            self.stream = None;
            self.notify(&e);
        } else {
            debug!(count, "flushed metrics");
        }
    }

    async fn write(&mut self, payload: &[u8], count: usize) -> Result<(), SenderError> {
        let endpoint = &self.config.endpoint;

        if self.stream.is_none() {
            let stream =
                TcpStream::connect(endpoint)
                    .await
                    .map_err(|e| SenderError::Connect {
                        endpoint: endpoint.clone(),
                        source: Arc::new(e),
                    })?;
            debug!("connected");
            self.stream = Some(stream);
        }

        let Some(stream) = self.stream.as_mut() else {
            return Err(SenderError::Closed);
        };

        let result = async {
            stream.write_all(payload).await?;
            stream.flush().await
        }
        .await;

        result.map_err(|e| SenderError::Write {
            endpoint: endpoint.clone(),
            count,
            source: Arc::new(e),
        })
    }

    fn notify(&self, error: &SenderError) {
        if let Some(listener) = &self.config.error_listener {
            listener(error);
        }
    }
}
