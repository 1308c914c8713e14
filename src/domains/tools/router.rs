//! Tool Router - builds the rmcp ToolRouter from the registry.
//!
//! Every proxy entry becomes one dynamic route whose handler hands the call
//! to the [`Dispatcher`]. The routes are built once, after discovery.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, ToolRouter},
    model::Tool,
};
use serde_json::Value;
use tracing::info;

use super::dispatcher::Dispatcher;

/// Build the tool router with one route per proxied tool.
pub fn build_tool_router<S>(dispatcher: &Dispatcher) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    dispatcher
        .catalog()
        .into_iter()
        .fold(ToolRouter::new(), |router, tool| {
            router.with_route(proxy_route(dispatcher.clone(), tool))
        })
}

/// Create a ToolRoute that forwards to the owning upstream.
///
/// The call is abandoned when the client cancels the request; the shared
/// upstream connection is left untouched.
fn proxy_route<S>(dispatcher: Dispatcher, tool: Tool) -> ToolRoute<S>
where
    S: Send + Sync + 'static,
{
    let name = tool.name.to_string();
    ToolRoute::new_dyn(tool, move |ctx: ToolCallContext<'_, S>| {
        let arguments = ctx
            .arguments
            .clone()
            .map(Value::Object)
            .unwrap_or(Value::Null);
        let cancelled = ctx.request_context.ct.clone();
        let dispatcher = dispatcher.clone();
        let name = name.clone();
        async move {
            tokio::select! {
                _ = cancelled.cancelled() => {
                    info!("Call to '{}' cancelled by client", name);
                    Err(McpError::internal_error("request cancelled", None))
                }
                result = dispatcher.dispatch(&name, arguments) => match result {
                    Ok(result) => Ok(result),
                    Err(e) => e.into_response(),
                },
            }
        }
        .boxed()
    })
}
