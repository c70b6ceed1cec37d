//! Error types for the Knox client tool.

use crate::safety::sanitize_reqwest_error;
use rmcp::ErrorData;
use rmcp::model::{CallToolResult, Content};
use thiserror::Error;

/// Main error type for the adapter.
#[derive(Error, Debug)]
pub enum KnoxError {
    /// Invocation named a tool this server does not expose.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Arguments missing, of the wrong type, or out of range.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Upstream answered with a non-2xx status.
    #[error("HTTP error: {status} {reason}: {body}")]
    Http {
        status: u16,
        reason: String,
        body: String,
    },

    /// Network-level failure (DNS, connect, TLS, timeout, body read).
    #[error("HTTP transport error: {0}")]
    Transport(String),

    /// Startup configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for adapter operations.
pub type Result<T> = std::result::Result<T, KnoxError>;

impl From<reqwest::Error> for KnoxError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(sanitize_reqwest_error(&value))
    }
}

impl From<serde_json::Error> for KnoxError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidArguments(value.to_string())
    }
}

/// How a failed invocation reaches the MCP caller.
pub enum Surfaced {
    /// Protocol-level JSON-RPC error; the call never reached the upstream.
    Protocol(ErrorData),
    /// Tool ran and failed; reported as a result with `isError: true`.
    ToolResult(CallToolResult),
}

impl KnoxError {
    /// Status code carried by an [`KnoxError::Http`] failure.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn surface(self) -> Surfaced {
        match self {
            Self::UnknownTool(_) | Self::InvalidArguments(_) => {
                Surfaced::Protocol(ErrorData::invalid_params(self.to_string(), None))
            }
            Self::Http { .. } | Self::Transport(_) => {
                Surfaced::ToolResult(CallToolResult::error(vec![Content::text(self.to_string())]))
            }
            Self::Config(_) => Surfaced::Protocol(ErrorData::internal_error(self.to_string(), None)),
        }
    }
}
