//! Tool Registry - the aggregated catalog of proxied upstream tools.
//!
//! The registry is built once at startup by walking the configured
//! upstreams in order: connect, list tools, translate each schema and record
//! one [`ProxyToolEntry`] per tool. A failure at any step aborts the build,
//! so the gateway never serves a partial catalog. After construction the
//! registry is read-only.

use indexmap::IndexMap;
use rmcp::model::{JsonObject, Tool, ToolAnnotations};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{info, instrument, warn};

use super::error::StartupError;
use super::schema::InterfaceSchema;
use super::translate::translate;
use super::validator::Validator;
use crate::core::config::{CollisionPolicy, GatewayConfig};
use crate::domains::upstream::{UpstreamConnector, UpstreamTool, UpstreamToolClient};

// ============================================================================
// Proxy entries
// ============================================================================

/// A locally advertised tool that forwards to its owning upstream.
#[derive(Clone)]
pub struct ProxyToolEntry {
    name: String,
    title: Option<String>,
    description: String,
    validator: Validator,
    output_schema: Option<Arc<JsonObject>>,
    annotations: Option<ToolAnnotations>,
    owner: Arc<dyn UpstreamToolClient>,
}

impl ProxyToolEntry {
    /// Translate a discovered tool into an entry owned by `owner`.
    pub fn from_upstream(tool: UpstreamTool, owner: Arc<dyn UpstreamToolClient>) -> Self {
        let schema = InterfaceSchema::from_value(&tool.input_schema);
        Self {
            name: tool.name,
            title: tool.title,
            description: tool.description,
            validator: translate(&schema),
            output_schema: tool.output_schema.map(Arc::new),
            annotations: tool.annotations,
            owner,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn owner(&self) -> &Arc<dyn UpstreamToolClient> {
        &self.owner
    }

    /// The catalog descriptor, with the input schema derived from the
    /// validator and the upstream's other metadata passed through.
    pub fn to_tool(&self) -> Tool {
        Tool {
            name: self.name.clone().into(),
            title: self.title.clone(),
            description: Some(self.description.clone().into()),
            input_schema: Arc::new(self.input_schema()),
            output_schema: self.output_schema.clone(),
            annotations: self.annotations.clone(),
            icons: None,
            meta: None,
        }
    }

    /// Tool arguments are always a mapping, so the top level is advertised
    /// as an object schema whatever the upstream declared.
    fn input_schema(&self) -> Map<String, Value> {
        let object = match &self.validator {
            Validator::Nullable(inner) => inner.as_ref(),
            other => other,
        };
        match object {
            Validator::Object(_) | Validator::OpenObject => match object.to_json_schema() {
                Value::Object(schema) => schema,
                _ => bare_object_schema(),
            },
            _ => bare_object_schema(),
        }
    }
}

fn bare_object_schema() -> Map<String, Value> {
    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema
}

impl std::fmt::Debug for ProxyToolEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyToolEntry")
            .field("name", &self.name)
            .field("owner", &self.owner.id())
            .field("validator", &self.validator)
            .finish()
    }
}

// ============================================================================
// Tool Registry
// ============================================================================

/// The aggregated tool catalog.
#[derive(Default)]
pub struct ToolRegistry {
    entries: IndexMap<String, ProxyToolEntry>,
    upstreams: Vec<Arc<dyn UpstreamToolClient>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discover every configured upstream and build the catalog.
    #[instrument(skip_all, fields(upstreams = config.upstreams.len()))]
    pub async fn build(
        config: &GatewayConfig,
        connector: &dyn UpstreamConnector,
    ) -> Result<Self, StartupError> {
        let limit = config.discovery_timeout();
        let mut registry = Self::new();

        for upstream in &config.upstreams {
            info!("Discovering upstream '{}' at {}", upstream.id, upstream.address);

            let client = timeout(limit, connector.connect(upstream))
                .await
                .map_err(|_| StartupError::timeout(&upstream.id, "connecting", limit))?
                .map_err(StartupError::Connect)?;

            let tools = timeout(limit, client.list_tools())
                .await
                .map_err(|_| StartupError::timeout(&upstream.id, "tool discovery", limit))?
                .map_err(StartupError::Discovery)?;

            info!("Upstream '{}' provides {} tools", upstream.id, tools.len());

            for tool in tools {
                let entry = ProxyToolEntry::from_upstream(tool, client.clone());
                registry.insert(entry, config.collision_policy)?;
            }
            registry.upstreams.push(client);
        }

        info!(
            "Catalog ready: {} tools from {} upstreams",
            registry.len(),
            registry.upstreams.len()
        );

        Ok(registry)
    }

    /// Record an entry, applying the collision policy.
    pub fn insert(
        &mut self,
        entry: ProxyToolEntry,
        policy: CollisionPolicy,
    ) -> Result<(), StartupError> {
        if let Some(previous) = self.entries.get(entry.name()) {
            let first = previous.owner().id().to_string();
            let second = entry.owner().id().to_string();
            match policy {
                CollisionPolicy::LastWins => warn!(
                    "Tool '{}' from upstream '{}' replaces the one from '{}'",
                    entry.name(),
                    second,
                    first
                ),
                CollisionPolicy::Error => {
                    return Err(StartupError::NameCollision {
                        tool: entry.name().to_string(),
                        first,
                        second,
                    });
                }
            }
        }
        self.entries.insert(entry.name().to_string(), entry);
        Ok(())
    }

    /// Look up an entry by tool name.
    pub fn get(&self, name: &str) -> Option<&ProxyToolEntry> {
        self.entries.get(name)
    }

    /// All entries, in catalog order.
    pub fn entries(&self) -> impl Iterator<Item = &ProxyToolEntry> {
        self.entries.values()
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// The connected upstreams, in configured order.
    pub fn upstreams(&self) -> &[Arc<dyn UpstreamToolClient>] {
        &self.upstreams
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::UpstreamConfig;
    use crate::domains::upstream::testing::{StaticConnector, StaticUpstream, tool};

    fn gateway_config(ids: &[&str]) -> GatewayConfig {
        GatewayConfig {
            upstreams: ids
                .iter()
                .map(|id| UpstreamConfig::new(*id, format!("http://{id}/mcp")))
                .collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_build_collects_all_upstreams() {
        let connector = StaticConnector::default()
            .with(StaticUpstream::new("a", vec![tool("joke", json!({}))]))
            .with(StaticUpstream::new(
                "b",
                vec![tool("name-age", json!({ "type": "object" })), tool("ping", json!({}))],
            ));

        let registry = ToolRegistry::build(&gateway_config(&["a", "b"]), &connector)
            .await
            .unwrap();

        assert_eq!(registry.tool_names(), vec!["joke", "name-age", "ping"]);
        assert_eq!(registry.upstreams().len(), 2);
        assert_eq!(registry.get("joke").unwrap().owner().id(), "a");
        assert_eq!(registry.get("ping").unwrap().owner().id(), "b");

        // Discovery never invokes tools.
        assert!(connector.upstream("a").calls().is_empty());
        assert!(connector.upstream("b").calls().is_empty());
    }

    #[tokio::test]
    async fn test_name_collision_last_wins() {
        let connector = StaticConnector::default()
            .with(StaticUpstream::new("first", vec![tool("ping", json!({}))]))
            .with(StaticUpstream::new("second", vec![tool("ping", json!({}))]));

        let registry = ToolRegistry::build(&gateway_config(&["first", "second"]), &connector)
            .await
            .unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("ping").unwrap().owner().id(), "second");

        // Order of configuration decides, not the names.
        let registry = ToolRegistry::build(&gateway_config(&["second", "first"]), &connector)
            .await
            .unwrap();
        assert_eq!(registry.get("ping").unwrap().owner().id(), "first");
    }

    #[tokio::test]
    async fn test_name_collision_error_policy() {
        let connector = StaticConnector::default()
            .with(StaticUpstream::new("first", vec![tool("ping", json!({}))]))
            .with(StaticUpstream::new("second", vec![tool("ping", json!({}))]));

        let mut config = gateway_config(&["first", "second"]);
        config.collision_policy = CollisionPolicy::Error;

        let err = ToolRegistry::build(&config, &connector).await.err().unwrap();
        assert!(matches!(
            err,
            StartupError::NameCollision { ref tool, ref first, ref second }
                if tool == "ping" && first == "first" && second == "second"
        ));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_fatal() {
        let connector = StaticConnector::default()
            .with(StaticUpstream::new("a", vec![tool("joke", json!({}))]))
            .unreachable("b");

        let result = ToolRegistry::build(&gateway_config(&["a", "b"]), &connector).await;
        assert!(matches!(result, Err(StartupError::Connect(_))));
    }

    #[tokio::test]
    async fn test_stalled_upstream_times_out() {
        let connector = StaticConnector::default().stalled("slow");
        let mut config = gateway_config(&["slow"]);
        config.discovery_timeout_ms = 20;

        let result = ToolRegistry::build(&config, &connector).await;
        assert!(matches!(
            result,
            Err(StartupError::Timeout { ref upstream, stage: "connecting", .. }) if upstream == "slow"
        ));
    }

    #[tokio::test]
    async fn test_silent_upstream_times_out_during_discovery() {
        let connector = StaticConnector::default()
            .with(StaticUpstream::new("a", vec![tool("joke", json!({}))]))
            .with(StaticUpstream::new("quiet", vec![tool("ping", json!({}))]).silent());
        let mut config = gateway_config(&["a", "quiet"]);
        config.discovery_timeout_ms = 20;

        let result = ToolRegistry::build(&config, &connector).await;
        assert!(matches!(
            result,
            Err(StartupError::Timeout { ref upstream, stage: "tool discovery", .. })
                if upstream == "quiet"
        ));
    }

    #[tokio::test]
    async fn test_empty_configuration_builds_empty_catalog() {
        let registry = ToolRegistry::build(&GatewayConfig::default(), &StaticConnector::default())
            .await
            .unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_entry_advertises_derived_schema() {
        let owner: Arc<dyn UpstreamToolClient> = Arc::new(StaticUpstream::new("b", vec![]));
        let entry = ProxyToolEntry::from_upstream(
            tool(
                "name-age",
                json!({
                    "type": "object",
                    "properties": { "name": { "type": "string", "minLength": 1 } },
                    "required": ["name"],
                    "additionalProperties": false
                }),
            ),
            owner,
        );

        let advertised = entry.to_tool();
        assert_eq!(advertised.name, "name-age");
        assert_eq!(
            Value::Object((*advertised.input_schema).clone()),
            json!({
                "type": "object",
                "properties": { "name": { "type": "string" } },
                "required": ["name"]
            })
        );
    }

    #[test]
    fn test_entry_keeps_declared_property_order() {
        let owner: Arc<dyn UpstreamToolClient> = Arc::new(StaticUpstream::new("b", vec![]));
        let schema: Value = serde_json::from_str(
            r#"{"type":"object","properties":{"zip":{"type":"string"},"city":{"type":"string"},"age":{"type":"integer"}}}"#,
        )
        .unwrap();
        let entry = ProxyToolEntry::from_upstream(tool("address", schema), owner);

        let advertised = entry.to_tool();
        let keys: Vec<_> = advertised.input_schema["properties"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, vec!["zip", "city", "age"]);
    }

    #[test]
    fn test_entry_passes_metadata_through() {
        let owner: Arc<dyn UpstreamToolClient> = Arc::new(StaticUpstream::new("b", vec![]));
        let output = json!({ "type": "object", "properties": { "age": { "type": "integer" } } });
        let annotations = ToolAnnotations {
            read_only_hint: Some(true),
            open_world_hint: Some(true),
            ..Default::default()
        };
        let mut discovered = tool("name-age", json!({ "type": "object" }));
        discovered.title = Some("Name to age".to_string());
        discovered.output_schema = output.as_object().cloned();
        discovered.annotations = Some(annotations.clone());

        let advertised = ProxyToolEntry::from_upstream(discovered, owner).to_tool();
        assert_eq!(advertised.title.as_deref(), Some("Name to age"));
        assert_eq!(advertised.annotations, Some(annotations));
        assert_eq!(
            advertised.output_schema.map(|schema| Value::Object((*schema).clone())),
            Some(output)
        );
    }

    #[test]
    fn test_non_object_top_level_advertises_object() {
        for upstream_schema in [
            json!({ "type": "string" }),
            json!({ "type": "array", "items": { "type": "integer" } }),
        ] {
            let owner: Arc<dyn UpstreamToolClient> = Arc::new(StaticUpstream::new("b", vec![]));
            let entry = ProxyToolEntry::from_upstream(tool("odd", upstream_schema), owner);
            assert_eq!(
                Value::Object((*entry.to_tool().input_schema).clone()),
                json!({ "type": "object" })
            );
        }

        // A nullable object is advertised as the object itself.
        let owner: Arc<dyn UpstreamToolClient> = Arc::new(StaticUpstream::new("b", vec![]));
        let entry = ProxyToolEntry::from_upstream(
            tool(
                "maybe",
                json!({
                    "type": ["object", "null"],
                    "properties": { "name": { "type": "string" } }
                }),
            ),
            owner,
        );
        assert_eq!(
            Value::Object((*entry.to_tool().input_schema).clone()),
            json!({ "type": "object", "properties": { "name": { "type": "string" } } })
        );
    }

    #[test]
    fn test_entry_with_unusable_schema_advertises_object() {
        let owner: Arc<dyn UpstreamToolClient> = Arc::new(StaticUpstream::new("b", vec![]));
        let entry = ProxyToolEntry::from_upstream(tool("odd", json!("not a schema")), owner);

        assert_eq!(*entry.validator(), Validator::Any);
        assert_eq!(
            Value::Object((*entry.to_tool().input_schema).clone()),
            json!({ "type": "object" })
        );
    }
}
