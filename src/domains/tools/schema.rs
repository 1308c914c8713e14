//! Interface schemas advertised by upstream tools.
//!
//! Upstreams describe their arguments with an open, JSON-Schema-like
//! document. This module folds that document into a closed sum type so the
//! translator can match on it exhaustively. Parsing is total: anything that
//! is missing, malformed or unknown becomes [`SchemaKind::Any`].

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Nesting depth after which nodes are treated as unconstrained.
const MAX_DEPTH: usize = 64;

/// One node of an upstream's argument description.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceSchema {
    pub kind: SchemaKind,
    pub nullable: bool,
    pub description: Option<String>,
}

/// The shape a schema node describes.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    Any,
    String { allowed: Option<Vec<String>> },
    Number,
    Integer,
    Boolean,
    Null,
    Array { items: Option<Box<InterfaceSchema>> },
    Object {
        properties: IndexMap<String, InterfaceSchema>,
        required: Vec<String>,
    },
    /// Ordered members from a `type` list, `anyOf` or `oneOf`.
    Union(Vec<InterfaceSchema>),
}

impl InterfaceSchema {
    /// An unconstrained node.
    pub fn any() -> Self {
        Self::of(SchemaKind::Any)
    }

    /// A non-nullable node of the given kind.
    pub fn of(kind: SchemaKind) -> Self {
        Self {
            kind,
            nullable: false,
            description: None,
        }
    }

    /// Mark this node nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Parse a raw schema document. Never fails.
    pub fn from_value(value: &Value) -> Self {
        Self::parse(value, 0)
    }

    fn parse(value: &Value, depth: usize) -> Self {
        let Some(node) = value.as_object() else {
            return Self::any();
        };
        if depth >= MAX_DEPTH {
            return Self::any();
        }

        let kind = match node.get("type") {
            Some(Value::String(name)) => parse_kind(name, node, depth),
            Some(Value::Array(names)) => {
                let mut members: Vec<InterfaceSchema> = names
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|name| Self::of(parse_kind(name, node, depth)))
                    .collect();
                match members.len() {
                    0 => SchemaKind::Any,
                    1 => members.remove(0).kind,
                    _ => SchemaKind::Union(members),
                }
            }
            Some(_) => SchemaKind::Any,
            None => parse_untyped(node, depth),
        };

        Self {
            kind,
            nullable: node
                .get("nullable")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            description: node
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }

    /// Whether this node only accepts `null`.
    pub fn is_null(&self) -> bool {
        matches!(self.kind, SchemaKind::Null)
    }
}

fn parse_kind(name: &str, node: &Map<String, Value>, depth: usize) -> SchemaKind {
    match name {
        "string" => SchemaKind::String {
            allowed: string_enum(node),
        },
        "number" => SchemaKind::Number,
        "integer" => SchemaKind::Integer,
        "boolean" => SchemaKind::Boolean,
        "null" => SchemaKind::Null,
        "array" => SchemaKind::Array {
            items: node
                .get("items")
                .filter(|items| items.is_object())
                .map(|items| Box::new(InterfaceSchema::parse(items, depth + 1))),
        },
        "object" => parse_object(node, depth),
        _ => SchemaKind::Any,
    }
}

/// Nodes without `type`: unions via `anyOf`/`oneOf`, or a bare string `enum`.
fn parse_untyped(node: &Map<String, Value>, depth: usize) -> SchemaKind {
    let members = node
        .get("anyOf")
        .or_else(|| node.get("oneOf"))
        .and_then(Value::as_array);

    if let Some(members) = members {
        let members: Vec<InterfaceSchema> = members
            .iter()
            .map(|member| InterfaceSchema::parse(member, depth + 1))
            .collect();
        return match members.len() {
            0 => SchemaKind::Any,
            _ => SchemaKind::Union(members),
        };
    }

    match string_enum(node) {
        Some(allowed) => SchemaKind::String {
            allowed: Some(allowed),
        },
        None => SchemaKind::Any,
    }
}

fn parse_object(node: &Map<String, Value>, depth: usize) -> SchemaKind {
    let properties: IndexMap<String, InterfaceSchema> = node
        .get("properties")
        .and_then(Value::as_object)
        .map(|props| {
            props
                .iter()
                .map(|(name, schema)| (name.clone(), InterfaceSchema::parse(schema, depth + 1)))
                .collect()
        })
        .unwrap_or_default();

    // Names listed as required but never declared are dropped.
    let mut required: Vec<String> = Vec::new();
    for name in node
        .get("required")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
    {
        if properties.contains_key(name) && !required.iter().any(|r| r == name) {
            required.push(name.to_string());
        }
    }

    SchemaKind::Object {
        properties,
        required,
    }
}

fn string_enum(node: &Map<String, Value>) -> Option<Vec<String>> {
    let allowed: Vec<String> = node
        .get("enum")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();
    (!allowed.is_empty()).then_some(allowed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_primitives() {
        for (raw, expected) in [
            ("number", SchemaKind::Number),
            ("integer", SchemaKind::Integer),
            ("boolean", SchemaKind::Boolean),
            ("null", SchemaKind::Null),
        ] {
            let schema = InterfaceSchema::from_value(&json!({ "type": raw }));
            assert_eq!(schema.kind, expected);
        }
    }

    #[test]
    fn test_parse_string_enum_keeps_order() {
        let schema = InterfaceSchema::from_value(&json!({
            "type": "string",
            "enum": ["y", "x", 3]
        }));
        assert_eq!(
            schema.kind,
            SchemaKind::String {
                allowed: Some(vec!["y".to_string(), "x".to_string()])
            }
        );
    }

    #[test]
    fn test_parse_object_drops_undeclared_required() {
        let schema = InterfaceSchema::from_value(&json!({
            "type": "object",
            "properties": {
                "name": { "type": "string", "description": "Who" },
                "age": { "type": "integer" }
            },
            "required": ["name", "ghost", "name"]
        }));

        let SchemaKind::Object {
            properties,
            required,
        } = schema.kind
        else {
            panic!("expected object");
        };
        assert_eq!(required, vec!["name".to_string()]);
        let keys: Vec<_> = properties.keys().cloned().collect();
        assert_eq!(keys, vec!["name", "age"]);
        assert_eq!(properties["name"].description.as_deref(), Some("Who"));
    }

    #[test]
    fn test_parse_type_list_is_union() {
        let schema = InterfaceSchema::from_value(&json!({ "type": ["string", "null"] }));
        let SchemaKind::Union(members) = schema.kind else {
            panic!("expected union");
        };
        assert_eq!(members.len(), 2);
        assert!(members[1].is_null());
    }

    #[test]
    fn test_parse_any_of() {
        let schema = InterfaceSchema::from_value(&json!({
            "anyOf": [{ "type": "integer" }, { "type": "null" }]
        }));
        assert!(matches!(schema.kind, SchemaKind::Union(ref m) if m.len() == 2));
    }

    #[test]
    fn test_parse_malformed_is_any() {
        for raw in [
            json!(null),
            json!("string"),
            json!(42),
            json!({}),
            json!({ "type": "tuple" }),
            json!({ "type": 7 }),
            json!({ "type": [] }),
            json!({ "anyOf": [] }),
        ] {
            assert_eq!(InterfaceSchema::from_value(&raw).kind, SchemaKind::Any);
        }
    }

    #[test]
    fn test_parse_array_without_items() {
        let schema = InterfaceSchema::from_value(&json!({ "type": "array", "items": true }));
        assert_eq!(schema.kind, SchemaKind::Array { items: None });
    }

    #[test]
    fn test_parse_depth_is_bounded() {
        let mut raw = json!({ "type": "string" });
        for _ in 0..200 {
            raw = json!({ "type": "array", "items": raw });
        }
        // Must not overflow; the innermost levels collapse to Any.
        let schema = InterfaceSchema::from_value(&raw);
        assert!(matches!(schema.kind, SchemaKind::Array { .. }));
    }
}
