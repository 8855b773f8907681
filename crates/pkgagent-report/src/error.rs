//! Error types for pkgagent-report

use std::sync::Arc;

use thiserror::Error;

/// Errors that can occur while encoding a metric to line protocol
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Measurement name is empty
    #[error("metric has no measurement name")]
    EmptyMeasurement,

    /// Metric carries no fields
    #[error("metric {0} has no fields")]
    NoFields(String),

    /// A tag or field key is empty
    #[error("metric {0} has an empty tag or field key")]
    EmptyKey(String),

    /// Float field is NaN or infinite
    #[error("field {0} is not a finite number")]
    NonFiniteFloat(String),

    /// Timestamp cannot be expressed as nanoseconds since the epoch
    #[error("timestamp {0} is out of range for nanosecond precision")]
    TimestampOutOfRange(String),
}

/// Errors raised by the background line-protocol sender
#[derive(Error, Debug, Clone)]
pub enum SenderError {
    /// Endpoint is not of the form `host:port`
    #[error("invalid endpoint {0}: expected host:port")]
    InvalidEndpoint(String),

    /// Could not connect to the endpoint
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        /// Endpoint that was dialed
        endpoint: String,
        /// Underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Writing buffered lines failed
    #[error("failed to write {count} metrics to {endpoint}: {source}")]
    Write {
        /// Endpoint the connection was bound to
        endpoint: String,
        /// Number of metrics dropped with the failed write
        count: usize,
        /// Underlying I/O error
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Sender task has stopped
    #[error("line protocol sender is closed")]
    Closed,
}

/// Errors surfaced when closing a reporter batch
#[derive(Error, Debug, Clone)]
pub enum ReportError {
    /// Flushing buffered metrics failed
    #[error("failed to flush metrics: {0}")]
    Flush(#[from] SenderError),

    /// Writing to the output stream failed
    #[error("failed to write output: {0}")]
    Io(String),
}
