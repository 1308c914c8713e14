//! Upstream domain module.
//!
//! Handles the connections to the MCP servers whose tools the gateway
//! aggregates: connecting, listing their tools and forwarding calls.

mod client;
mod error;

pub use client::{
    RmcpConnector, RmcpUpstreamClient, UpstreamConnector, UpstreamTool, UpstreamToolClient,
};
pub use error::UpstreamError;

/// In-process upstreams for unit tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::core::config::UpstreamConfig;
    use async_trait::async_trait;
    use rmcp::model::{CallToolResult, Content, JsonObject};
    use serde_json::Value;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};

    /// Build a discovery record.
    pub fn tool(name: &str, input_schema: Value) -> UpstreamTool {
        UpstreamTool {
            name: name.to_string(),
            title: None,
            description: format!("{name} tool"),
            input_schema,
            output_schema: None,
            annotations: None,
        }
    }

    /// An upstream with a fixed catalog that echoes who answered.
    pub struct StaticUpstream {
        id: String,
        tools: Vec<UpstreamTool>,
        broken: bool,
        silent: bool,
        calls: Mutex<Vec<(String, Option<JsonObject>)>>,
    }

    impl StaticUpstream {
        pub fn new(id: &str, tools: Vec<UpstreamTool>) -> Self {
            Self {
                id: id.to_string(),
                tools,
                broken: false,
                silent: false,
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Every invocation fails at the transport level.
        pub fn broken(mut self) -> Self {
            self.broken = true;
            self
        }

        /// Connects, but never answers `tools/list`.
        pub fn silent(mut self) -> Self {
            self.silent = true;
            self
        }

        pub fn calls(&self) -> Vec<(String, Option<JsonObject>)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl UpstreamToolClient for StaticUpstream {
        fn id(&self) -> &str {
            &self.id
        }

        fn address(&self) -> &str {
            "memory://static"
        }

        async fn list_tools(&self) -> Result<Vec<UpstreamTool>, UpstreamError> {
            if self.silent {
                futures::future::pending::<()>().await;
            }
            Ok(self.tools.clone())
        }

        async fn invoke(
            &self,
            tool: &str,
            arguments: Option<JsonObject>,
        ) -> Result<CallToolResult, UpstreamError> {
            self.calls
                .lock()
                .unwrap()
                .push((tool.to_string(), arguments));
            if self.broken {
                return Err(UpstreamError::invocation(&self.id, tool, "connection reset"));
            }
            Ok(CallToolResult::success(vec![Content::text(format!(
                "{}:{}",
                self.id, tool
            ))]))
        }
    }

    /// Hands out [`StaticUpstream`]s by id.
    #[derive(Default)]
    pub struct StaticConnector {
        upstreams: HashMap<String, Arc<StaticUpstream>>,
        unreachable: HashSet<String>,
        stalled: HashSet<String>,
    }

    impl StaticConnector {
        pub fn with(mut self, upstream: StaticUpstream) -> Self {
            self.upstreams
                .insert(upstream.id.clone(), Arc::new(upstream));
            self
        }

        pub fn unreachable(mut self, id: &str) -> Self {
            self.unreachable.insert(id.to_string());
            self
        }

        /// Connecting to this id never completes.
        pub fn stalled(mut self, id: &str) -> Self {
            self.stalled.insert(id.to_string());
            self
        }

        pub fn upstream(&self, id: &str) -> Arc<StaticUpstream> {
            self.upstreams[id].clone()
        }
    }

    #[async_trait]
    impl UpstreamConnector for StaticConnector {
        async fn connect(
            &self,
            upstream: &UpstreamConfig,
        ) -> Result<Arc<dyn UpstreamToolClient>, UpstreamError> {
            if self.stalled.contains(&upstream.id) {
                futures::future::pending::<()>().await;
            }
            if self.unreachable.contains(&upstream.id) {
                return Err(UpstreamError::connection(
                    &upstream.id,
                    &upstream.address,
                    "connection refused",
                ));
            }
            match self.upstreams.get(&upstream.id) {
                Some(client) => Ok(client.clone()),
                None => Err(UpstreamError::connection(
                    &upstream.id,
                    &upstream.address,
                    "no such upstream",
                )),
            }
        }
    }
}
