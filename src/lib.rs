//! MCP Tool Gateway Library
//!
//! This crate aggregates the tools of several upstream MCP servers into one
//! catalog and serves it to MCP clients as if every tool were local.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the MCP server handler and transports
//! - **domains**: business logic organized by bounded contexts
//!   - **upstream**: client connections to the upstream servers
//!   - **tools**: schema translation, the catalog and call dispatch
//!   - **demo**: example tools served by the `demo-upstream` binary
//!
//! Startup is strictly ordered: every upstream is connected and listed before
//! anything is served. A single failure aborts startup.
//!
//! # Example
//!
//! ```rust,no_run
//! use tool_gateway::core::{Config, GatewayServer, TransportService};
//! use tool_gateway::domains::upstream::RmcpConnector;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let server = GatewayServer::bootstrap(config.clone(), &RmcpConnector).await?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, GatewayServer, Result};
