//! Joke tool definition.
//!
//! A no-argument tool that fetches a random joke from a public web API.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, schema_for_type},
    model::{CallToolResult, Content, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::DemoState;

/// The joke tool takes no parameters.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct JokeParams {}

/// Response body of the joke API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Joke {
    pub setup: String,
    pub punchline: String,
}

/// Joke tool - tells a random joke.
pub struct JokeTool;

impl JokeTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "joke";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Tell a random joke.";

    /// Render a joke as setup and punchline separated by a blank line.
    pub fn format(joke: &Joke) -> String {
        format!("{}\n\n{}", joke.setup, joke.punchline)
    }

    #[instrument(skip_all)]
    pub async fn execute(state: &DemoState) -> CallToolResult {
        info!("Joke tool called");

        match Self::fetch(state).await {
            Ok(joke) => CallToolResult::success(vec![Content::text(Self::format(&joke))]),
            Err(e) => {
                warn!("Joke API request failed: {}", e);
                CallToolResult::error(vec![Content::text(format!(
                    "Could not fetch a joke: {}",
                    e
                ))])
            }
        }
    }

    async fn fetch(state: &DemoState) -> Result<Joke, reqwest::Error> {
        state
            .client
            .get(&state.config.joke_api)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<JokeParams>().into(),
            annotations: None,
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Create a ToolRoute for the demo server.
    pub fn create_route<S>(state: Arc<DemoState>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |_ctx: ToolCallContext<'_, S>| {
            let state = state.clone();
            async move { Ok::<_, McpError>(Self::execute(&state).await) }.boxed()
        })
    }
}
