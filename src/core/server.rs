//! Gateway server implementation.
//!
//! This module contains the MCP server handler that advertises the
//! aggregated catalog and routes tool calls through the [`Dispatcher`].
//!
//! One `GatewayServer` is built per process after discovery. Transports
//! clone it freely; clones share the registry and upstream connections, so
//! serving a new client or request never reconnects to an upstream.

use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::tool::{ToolCallContext, ToolRouter},
    model::*,
    service::RequestContext,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use super::config::Config;
use super::error::Result as GatewayResult;
use crate::domains::tools::{DispatchError, Dispatcher, ToolRegistry, build_tool_router};
use crate::domains::upstream::UpstreamConnector;

const INSTRUCTIONS: &str = "This gateway aggregates tools from several upstream MCP servers. \
     Call any listed tool as if it were local; arguments are checked before forwarding.";

/// The gateway's MCP server handler.
#[derive(Clone)]
pub struct GatewayServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Routes calls to the owning upstream.
    dispatcher: Dispatcher,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl GatewayServer {
    /// Create a gateway server over a fully built registry.
    pub fn new(config: Config, registry: ToolRegistry) -> Self {
        let dispatcher = Dispatcher::new(Arc::new(registry));
        info!("Serving {} proxied tools", dispatcher.registry().len());

        Self {
            tool_router: build_tool_router::<Self>(&dispatcher),
            config: Arc::new(config),
            dispatcher,
        }
    }

    /// Discover every configured upstream, then build the server.
    ///
    /// Fails without serving anything if any upstream cannot be discovered.
    pub async fn bootstrap(
        config: Config,
        connector: &dyn UpstreamConnector,
    ) -> GatewayResult<Self> {
        let registry = ToolRegistry::build(&config.gateway, connector).await?;
        Ok(Self::new(config, registry))
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools, in catalog order.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.dispatcher.catalog()
    }

    /// Call a tool by name (for HTTP transport).
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<CallToolResult, DispatchError> {
        self.dispatcher.dispatch(name, arguments).await
    }
}

/// Calls go through the tool router. Listing reads the registry directly,
/// since the router does not keep catalog order.
impl ServerHandler for GatewayServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let ctx = ToolCallContext::new(self, request, context);
        self.tool_router.call(ctx).await
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            tools: self.dispatcher.catalog(),
            meta: None,
            next_cursor: None,
        })
    }
}
