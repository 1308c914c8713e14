//! Tools domain module.
//!
//! This module turns upstream tool descriptions into the gateway's own
//! catalog and routes calls back to the upstream that owns each tool.
//!
//! ## Architecture
//!
//! - `schema.rs` - Closed model of upstream interface descriptions
//! - `validator.rs` - Runtime argument validators
//! - `translate.rs` - Schema to validator translation
//! - `registry.rs` - Startup discovery and the aggregated catalog
//! - `dispatcher.rs` - Per-call validation and forwarding
//! - `router.rs` - rmcp ToolRouter built from the registry
//! - `error.rs` - Startup and dispatch error types

mod dispatcher;
mod error;
mod registry;
pub mod router;
pub mod schema;
pub mod translate;
pub mod validator;

pub use dispatcher::Dispatcher;
pub use error::{DispatchError, StartupError};
pub use registry::{ProxyToolEntry, ToolRegistry};
pub use router::build_tool_router;
pub use schema::{InterfaceSchema, SchemaKind};
pub use translate::translate;
pub use validator::{FieldValidator, ValidationError, Validator, Violation};
