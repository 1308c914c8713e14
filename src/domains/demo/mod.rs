//! Demo upstream domain.
//!
//! A small MCP server exposing two leaf tools, `joke` and `name-age`, backed
//! by public web APIs. It is what the `demo-upstream` binary serves, so the
//! gateway can be tried locally against real upstreams.

mod joke;
mod name_age;

pub use joke::{Joke, JokeTool};
pub use name_age::{AgeEstimate, NameAgeParams, NameAgeTool};

use rmcp::{
    ErrorData as McpError, ServerHandler, handler::server::tool::ToolRouter, model::*,
    tool_handler,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_JOKE_API: &str = "https://official-joke-api.appspot.com/random_joke";
const DEFAULT_AGIFY_API: &str = "https://api.agify.io";

/// Demo server configuration.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Names of the tools to serve.
    pub tools: Vec<String>,

    /// Endpoint returning a random joke.
    pub joke_api: String,

    /// Endpoint estimating an age from `?name=`.
    pub agify_api: String,

    /// Per-request timeout for the web APIs.
    pub request_timeout: Duration,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            tools: vec![JokeTool::NAME.to_string(), NameAgeTool::NAME.to_string()],
            joke_api: DEFAULT_JOKE_API.to_string(),
            agify_api: DEFAULT_AGIFY_API.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl DemoConfig {
    /// Load from `DEMO_TOOLS`, `DEMO_JOKE_API` and `DEMO_AGIFY_API`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("DEMO_TOOLS") {
            config.tools = raw
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect();
        }
        if let Ok(url) = std::env::var("DEMO_JOKE_API") {
            config.joke_api = url;
        }
        if let Ok(url) = std::env::var("DEMO_AGIFY_API") {
            config.agify_api = url;
        }

        config
    }
}

/// Shared state handed to every demo tool route.
pub struct DemoState {
    pub client: reqwest::Client,
    pub config: DemoConfig,
}

/// The demo MCP server.
#[derive(Clone)]
pub struct DemoServer {
    tool_router: ToolRouter<Self>,
}

impl DemoServer {
    pub fn new(config: DemoConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tool-gateway-demo/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;
        let state = Arc::new(DemoState { client, config });

        let mut tool_router = ToolRouter::new();
        for name in &state.config.tools {
            tool_router = match name.as_str() {
                JokeTool::NAME => tool_router.with_route(JokeTool::create_route(state.clone())),
                NameAgeTool::NAME => {
                    tool_router.with_route(NameAgeTool::create_route(state.clone()))
                }
                other => {
                    warn!("Ignoring unknown demo tool '{}'", other);
                    tool_router
                }
            };
        }
        info!("Demo server serving {} tools", tool_router.list_all().len());

        Ok(Self { tool_router })
    }

    pub fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }
}

#[tool_handler]
impl ServerHandler for DemoServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("Demo upstream with a joke tool and an age estimator.".to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_serves_both_tools() {
        let server = DemoServer::new(DemoConfig::default()).unwrap();
        let names: Vec<_> = server
            .list_tools()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"joke".to_string()));
        assert!(names.contains(&"name-age".to_string()));
    }

    #[test]
    fn test_tool_selection() {
        let config = DemoConfig {
            tools: vec!["name-age".to_string(), "bogus".to_string()],
            ..Default::default()
        };
        let server = DemoServer::new(config).unwrap();
        let tools = server.list_tools();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "name-age");
    }
}
