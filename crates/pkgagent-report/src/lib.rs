//! pkgagent-report: Reporting sinks for package inventories
//!
//! Line protocol encoding plus the three reporters: a human-readable
//! console table, line protocol on a text stream, and line protocol over TCP.

pub mod console;
pub mod error;
pub mod lineproto;
pub mod lp_console;
pub mod output;
pub mod sender;
pub mod socket;
pub mod traits;

pub use console::ConsoleReporter;
pub use error::{EncodeError, ReportError, SenderError};
pub use lineproto::{FieldValue, Metric, failure_metric, package_metrics};
pub use lp_console::LineProtocolConsoleReporter;
pub use output::SharedWriter;
pub use sender::{LineProtocolSender, SenderConfig};
pub use socket::LineProtocolSocketReporter;
pub use traits::{Reporter, ReporterBatch};
