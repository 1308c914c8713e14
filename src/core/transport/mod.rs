//! Transport layer for the gateway.
//!
//! This module provides the ways a client can reach the gateway:
//! - **STDIO**: Standard input/output (default for MCP) - feature: `stdio`
//! - **HTTP**: JSON-RPC over POST requests - feature: `http`
//!
//! Both transports hand every request to the same [`GatewayServer`], whose
//! catalog was built before the transport started.
//!
//! [`GatewayServer`]: crate::core::GatewayServer

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "http")]
pub use config::HttpConfig;
