//! Upstream-specific error types.

use thiserror::Error;

/// Errors raised while talking to an upstream MCP server.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The upstream could not be reached or rejected the handshake.
    #[error("Failed to connect to upstream '{upstream}' at {address}: {message}")]
    Connection {
        upstream: String,
        address: String,
        message: String,
    },

    /// The upstream's tool listing was unreachable or malformed.
    #[error("Tool discovery failed for upstream '{upstream}': {message}")]
    Discovery { upstream: String, message: String },

    /// A forwarded tool call failed before producing a result.
    #[error("Call to '{tool}' on upstream '{upstream}' failed: {message}")]
    Invocation {
        upstream: String,
        tool: String,
        message: String,
    },
}

impl UpstreamError {
    /// Create a new connection error.
    pub fn connection(
        upstream: impl Into<String>,
        address: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        Self::Connection {
            upstream: upstream.into(),
            address: address.into(),
            message: message.to_string(),
        }
    }

    /// Create a new discovery error.
    pub fn discovery(upstream: impl Into<String>, message: impl ToString) -> Self {
        Self::Discovery {
            upstream: upstream.into(),
            message: message.to_string(),
        }
    }

    /// Create a new invocation error.
    pub fn invocation(
        upstream: impl Into<String>,
        tool: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        Self::Invocation {
            upstream: upstream.into(),
            tool: tool.into(),
            message: message.to_string(),
        }
    }
}
