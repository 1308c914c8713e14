//! Dispatcher - routes inbound calls to their owning upstream.

use rmcp::model::{CallToolResult, Tool};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use super::error::DispatchError;
use super::registry::ToolRegistry;
use super::validator::ValidationError;

/// Stateless call router over a built [`ToolRegistry`].
///
/// Cheap to clone; every clone shares the same registry and upstream
/// connections.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Catalog descriptors for every proxied tool, in catalog order.
    pub fn catalog(&self) -> Vec<Tool> {
        self.registry.entries().map(|entry| entry.to_tool()).collect()
    }

    /// Validate `arguments` and forward the call.
    ///
    /// Missing arguments (`null`) count as an empty mapping. The upstream
    /// receives the normalized arguments and its result is returned as is.
    #[instrument(skip(self, arguments))]
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<CallToolResult, DispatchError> {
        let Some(entry) = self.registry.get(name) else {
            warn!("Unknown tool requested: {}", name);
            return Err(DispatchError::unknown_tool(name));
        };

        let arguments = match arguments {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        let coerced = entry
            .validator()
            .validate(&arguments)
            .map_err(|e| DispatchError::validation(name, e))?;

        let coerced = match coerced {
            Value::Object(map) => map,
            other => {
                return Err(DispatchError::validation(
                    name,
                    ValidationError::at_root("object", &other),
                ));
            }
        };

        debug!("Forwarding '{}' to upstream '{}'", name, entry.owner().id());

        let result = entry.owner().invoke(name, Some(coerced)).await?;
        Ok(result)
    }
}
