//! Command line flags

use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Collects the installed package inventory and reports it to the console or
/// to a line protocol socket listener
#[derive(Parser, Debug)]
#[command(name = "pkgagent", version, about)]
pub struct Args {
    /// Enable debug logging
    #[arg(long, env = "PKGAGENT_DEBUG")]
    pub debug: bool,

    /// Log as JSON instead of human-readable text
    #[arg(long, env = "PKGAGENT_LOG_JSON")]
    pub log_json: bool,

    /// Directory of `*.json` collection configs; runs scheduled collections
    /// until interrupted. Without it, collects once and exits.
    #[arg(long, env = "PKGAGENT_CONFIGS")]
    pub configs: Option<PathBuf>,

    /// Collect Debian packages in single-shot mode
    #[arg(long, env = "PKGAGENT_INCLUDE_DEBIAN", default_value_t = true, action = ArgAction::Set)]
    pub include_debian: bool,

    /// Collect RPM packages in single-shot mode
    #[arg(long, env = "PKGAGENT_INCLUDE_RPM", default_value_t = true, action = ArgAction::Set)]
    pub include_rpm: bool,

    /// Print line protocol to stdout instead of a table
    #[arg(long, env = "PKGAGENT_LINE_PROTOCOL_TO_CONSOLE")]
    pub line_protocol_to_console: bool,

    /// Send line protocol to a socket listener at `host:port`
    #[arg(long, env = "PKGAGENT_LINE_PROTOCOL_TO_SOCKET", value_name = "HOST:PORT")]
    pub line_protocol_to_socket: Option<String>,
}

/// Where collected inventories go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    Console,
    LineProtocolConsole,
    LineProtocolSocket(String),
}

impl Args {
    /// Socket wins over line protocol console, which wins over the table
    pub fn sink(&self) -> Sink {
        if let Some(endpoint) = &self.line_protocol_to_socket {
            Sink::LineProtocolSocket(endpoint.clone())
        } else if self.line_protocol_to_console {
            Sink::LineProtocolConsole
        } else {
            Sink::Console
        }
    }
}
