//! Tool-specific error types.

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

use super::validator::ValidationError;
use crate::domains::upstream::UpstreamError;

/// Errors that abort catalog construction. All of them are fatal.
#[derive(Debug, Error)]
pub enum StartupError {
    /// An upstream could not be connected to.
    #[error(transparent)]
    Connect(UpstreamError),

    /// An upstream's tool listing failed.
    #[error(transparent)]
    Discovery(UpstreamError),

    /// Connecting to or listing an upstream took too long.
    #[error("Upstream '{upstream}' did not finish {stage} within {timeout:?}")]
    Timeout {
        upstream: String,
        stage: &'static str,
        timeout: Duration,
    },

    /// Two upstreams advertise the same tool and collisions are fatal.
    #[error("Tool '{tool}' is advertised by both '{first}' and '{second}'")]
    NameCollision {
        tool: String,
        first: String,
        second: String,
    },
}

impl StartupError {
    /// Create a new timeout error.
    pub fn timeout(upstream: impl Into<String>, stage: &'static str, timeout: Duration) -> Self {
        Self::Timeout {
            upstream: upstream.into(),
            stage,
            timeout,
        }
    }
}

/// Errors that can occur while dispatching a single call.
///
/// These never affect other calls or the registry.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The requested tool was not found.
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// The arguments failed the tool's validator.
    #[error("Invalid arguments for '{tool}': {source}")]
    Validation {
        tool: String,
        #[source]
        source: ValidationError,
    },

    /// The forwarded call failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl DispatchError {
    /// Create a new "unknown tool" error.
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }

    /// Create a new validation error.
    pub fn validation(tool: impl Into<String>, source: ValidationError) -> Self {
        Self::Validation {
            tool: tool.into(),
            source,
        }
    }

    /// Convert into what an MCP caller sees.
    ///
    /// Upstream failures become a failed tool result; caller mistakes become
    /// `invalid_params` protocol errors with the violations attached.
    pub fn into_response(self) -> Result<CallToolResult, McpError> {
        match self {
            Self::UnknownTool(_) => Err(McpError::invalid_params(self.to_string(), None)),
            Self::Validation { ref tool, ref source } => {
                let data = json!({
                    "tool": tool,
                    "violations": source.violations(),
                });
                Err(McpError::invalid_params(self.to_string(), Some(data)))
            }
            Self::Upstream(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
        }
    }
}
