//! Domains module containing business logic organized by bounded contexts.
//!
//! - **upstream**: connections to the MCP servers whose tools are proxied
//! - **tools**: schema translation, the aggregated catalog and call dispatch
//! - **demo**: two small tools served by the bundled demo upstream

pub mod demo;
pub mod tools;
pub mod upstream;
