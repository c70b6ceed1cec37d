//! Command-line configuration.

use clap::{Parser, ValueEnum};
use std::time::Duration;

/// MCP stdio server exposing the `knox_client` HTTP tool.
#[derive(Debug, Clone, Parser)]
#[command(name = "knox-mcp-client", version, about)]
pub struct Cli {
    /// Log filter directive (trace, debug, info, warn, error, or `RUST_LOG` syntax).
    #[arg(long, env = "KNOX_MCP_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format. Logs always go to stderr.
    #[arg(long, env = "KNOX_MCP_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Per-request timeout in seconds; 0 keeps the HTTP client default.
    #[arg(long, env = "KNOX_MCP_REQUEST_TIMEOUT_SECS", default_value_t = 0)]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl Cli {
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
