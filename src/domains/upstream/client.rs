//! Upstream tool clients.
//!
//! One client per configured upstream, connected once at startup and shared
//! by every call routed to it. The rmcp peer multiplexes concurrent requests
//! over its single connection, so calls need no extra serialization here.

use async_trait::async_trait;
use rmcp::{
    ServiceExt,
    model::{CallToolRequestParam, CallToolResult, JsonObject, Tool, ToolAnnotations},
    service::{RoleClient, RunningService},
    transport::{IntoTransport, StreamableHttpClientTransport},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::UpstreamError;
use crate::core::config::UpstreamConfig;

/// A tool as advertised by an upstream's `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamTool {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    pub description: String,
    /// Raw interface description, parsed later by the translator.
    pub input_schema: Value,
    /// Passed through to the catalog untouched.
    #[serde(default)]
    pub output_schema: Option<JsonObject>,
    #[serde(default)]
    pub annotations: Option<ToolAnnotations>,
}

impl From<Tool> for UpstreamTool {
    fn from(tool: Tool) -> Self {
        Self {
            name: tool.name.to_string(),
            title: tool.title,
            description: tool.description.unwrap_or_default().to_string(),
            input_schema: Value::Object((*tool.input_schema).clone()),
            output_schema: tool.output_schema.map(|schema| (*schema).clone()),
            annotations: tool.annotations,
        }
    }
}

/// A connected upstream.
#[async_trait]
pub trait UpstreamToolClient: Send + Sync {
    /// The configured identifier.
    fn id(&self) -> &str;

    /// The configured endpoint address.
    fn address(&self) -> &str;

    /// List every tool the upstream advertises.
    async fn list_tools(&self) -> Result<Vec<UpstreamTool>, UpstreamError>;

    /// Call a tool and return the upstream's result untouched.
    async fn invoke(
        &self,
        tool: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, UpstreamError>;
}

/// Establishes upstream connections from configuration.
#[async_trait]
pub trait UpstreamConnector: Send + Sync {
    async fn connect(
        &self,
        upstream: &UpstreamConfig,
    ) -> Result<Arc<dyn UpstreamToolClient>, UpstreamError>;
}

/// Upstream client backed by an rmcp client session.
pub struct RmcpUpstreamClient {
    id: String,
    address: String,
    service: RunningService<RoleClient, ()>,
}

impl RmcpUpstreamClient {
    /// Connect over streamable HTTP.
    pub async fn connect_http(
        id: impl Into<String>,
        address: impl Into<String>,
    ) -> Result<Self, UpstreamError> {
        let address = address.into();
        let transport = StreamableHttpClientTransport::from_uri(address.as_str());
        Self::from_transport(id, address, transport).await
    }

    /// Run the MCP handshake over an arbitrary rmcp transport.
    pub async fn from_transport<T, E, A>(
        id: impl Into<String>,
        address: impl Into<String>,
        transport: T,
    ) -> Result<Self, UpstreamError>
    where
        T: IntoTransport<RoleClient, E, A>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let id = id.into();
        let address = address.into();

        let service: RunningService<RoleClient, ()> = ()
            .serve(transport)
            .await
            .map_err(|e| UpstreamError::connection(&id, &address, e))?;

        info!("Connected to upstream '{}' at {}", id, address);

        Ok(Self {
            id,
            address,
            service,
        })
    }
}

#[async_trait]
impl UpstreamToolClient for RmcpUpstreamClient {
    fn id(&self) -> &str {
        &self.id
    }

    fn address(&self) -> &str {
        &self.address
    }

    #[instrument(skip(self), fields(upstream = %self.id))]
    async fn list_tools(&self) -> Result<Vec<UpstreamTool>, UpstreamError> {
        let tools = self
            .service
            .peer()
            .list_all_tools()
            .await
            .map_err(|e| UpstreamError::discovery(&self.id, e))?;

        debug!("Upstream '{}' advertised {} tools", self.id, tools.len());

        Ok(tools.into_iter().map(UpstreamTool::from).collect())
    }

    #[instrument(skip(self, arguments), fields(upstream = %self.id))]
    async fn invoke(
        &self,
        tool: &str,
        arguments: Option<JsonObject>,
    ) -> Result<CallToolResult, UpstreamError> {
        let request = CallToolRequestParam {
            name: tool.to_string().into(),
            arguments,
        };

        self.service
            .peer()
            .call_tool(request)
            .await
            .map_err(|e| UpstreamError::invocation(&self.id, tool, e))
    }
}

/// Connects to upstreams over streamable HTTP.
#[derive(Debug, Clone, Default)]
pub struct RmcpConnector;

#[async_trait]
impl UpstreamConnector for RmcpConnector {
    async fn connect(
        &self,
        upstream: &UpstreamConfig,
    ) -> Result<Arc<dyn UpstreamToolClient>, UpstreamError> {
        let address = upstream.address.as_str();
        if !(address.starts_with("http://") || address.starts_with("https://")) {
            return Err(UpstreamError::connection(
                &upstream.id,
                address,
                "unsupported address, expected an http:// or https:// URL",
            ));
        }

        let client = RmcpUpstreamClient::connect_http(&upstream.id, address).await?;
        Ok(Arc::new(client))
    }
}
