//! Name-age tool definition.
//!
//! Estimates a person's age from their first name using a public web API.

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

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the name-age tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct NameAgeParams {
    /// First name to estimate the age for.
    pub name: String,
}

/// Response body of the age estimation API.
///
/// `age` is null when the API has no data for the name.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AgeEstimate {
    pub name: String,
    pub age: Option<u32>,
    #[serde(default)]
    pub count: u64,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Name-age tool - guesses an age from a first name.
pub struct NameAgeTool;

impl NameAgeTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "name-age";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Estimate the age of a person from their first name.";

    pub fn format(estimate: &AgeEstimate) -> String {
        match estimate.age {
            Some(age) => format!("The estimated age of {} is {}.", estimate.name, age),
            None => format!("No age estimate is available for {}.", estimate.name),
        }
    }

    #[instrument(skip_all, fields(name = %params.name))]
    pub async fn execute(params: &NameAgeParams, state: &DemoState) -> CallToolResult {
        info!("Name-age tool called");

        match Self::fetch(params, state).await {
            Ok(estimate) => CallToolResult::success(vec![Content::text(Self::format(&estimate))]),
            Err(e) => {
                warn!("Age API request failed: {}", e);
                CallToolResult::error(vec![Content::text(format!(
                    "Could not estimate an age for {}: {}",
                    params.name, e
                ))])
            }
        }
    }

    async fn fetch(
        params: &NameAgeParams,
        state: &DemoState,
    ) -> Result<AgeEstimate, reqwest::Error> {
        state
            .client
            .get(&state.config.agify_api)
            .query(&[("name", params.name.as_str())])
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
            input_schema: schema_for_type::<NameAgeParams>().into(),
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
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let state = state.clone();
            async move {
                let params: NameAgeParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                Ok(Self::execute(&params, &state).await)
            }
            .boxed()
        })
    }
}
