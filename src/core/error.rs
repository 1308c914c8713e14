//! Error types and handling for the gateway.
//!
//! This module defines a unified error type for the process-level steps:
//! loading configuration, building the catalog and running a transport.
//! Per-call failures stay in [`DispatchError`] and never reach this type.
//!
//! [`DispatchError`]: crate::domains::tools::DispatchError

use thiserror::Error;

/// A specialized Result type for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the gateway.
#[derive(Debug, Error)]
pub enum Error {
    /// The tool catalog could not be built.
    #[error("Startup error: {0}")]
    Startup(#[from] crate::domains::tools::StartupError),

    /// Error originating from the transport layer.
    #[error("Transport error: {0}")]
    Transport(#[from] super::transport::TransportError),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors from file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
