//! Runtime validators for tool arguments.
//!
//! A [`Validator`] is the checked counterpart of an [`InterfaceSchema`]
//! (see [`super::translate`]). Validation walks the whole value and reports
//! every violation it finds, each with a `$`-rooted path.
//!
//! [`InterfaceSchema`]: super::schema::InterfaceSchema

use serde::Serialize;
use serde_json::{Map, Value, json};
use std::fmt;
use thiserror::Error;

/// A runtime argument checker.
#[derive(Debug, Clone, PartialEq)]
pub enum Validator {
    /// Accepts anything.
    Any,
    String,
    /// A string restricted to a literal set, in listed order.
    Enum(Vec<String>),
    Number,
    /// A number with no fractional part.
    Integer,
    Boolean,
    Null,
    /// Every element must satisfy the inner validator.
    Array(Box<Validator>),
    /// Declared properties only; undeclared keys are dropped.
    Object(Vec<FieldValidator>),
    /// Any mapping, passed through as is.
    OpenObject,
    /// Accepts `null` in addition to the inner shape.
    Nullable(Box<Validator>),
}

/// A declared property of an object validator.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValidator {
    pub name: String,
    pub required: bool,
    pub description: Option<String>,
    pub validator: Validator,
}

/// One failed check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub path: String,
    pub expected: String,
    /// `None` when a required field is missing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.actual {
            Some(actual) => write!(
                f,
                "{}: expected {}, got {}",
                self.path, self.expected, actual
            ),
            None => write!(f, "{}: required {} is missing", self.path, self.expected),
        }
    }
}

/// Arguments rejected by a validator.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}", summarize(.violations))]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// A single violation at the root.
    pub fn at_root(expected: impl Into<String>, actual: &Value) -> Self {
        Self::new(vec![Violation {
            path: "$".to_string(),
            expected: expected.into(),
            actual: Some(actual.clone()),
        }])
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Validator {
    /// Wrap so `null` is also accepted.
    pub fn nullable(self) -> Self {
        match self {
            Self::Any | Self::Null | Self::Nullable(_) => self,
            other => Self::Nullable(Box::new(other)),
        }
    }

    /// Check a value and return its normalized form.
    pub fn validate(&self, value: &Value) -> Result<Value, ValidationError> {
        let mut violations = Vec::new();
        let normalized = self.check(value, "$", &mut violations);
        if violations.is_empty() {
            Ok(normalized)
        } else {
            Err(ValidationError::new(violations))
        }
    }

    /// Human-readable description of what this validator accepts.
    pub fn expected(&self) -> String {
        match self {
            Self::Any => "any value".to_string(),
            Self::String => "string".to_string(),
            Self::Enum(allowed) => format!(
                "one of {}",
                allowed
                    .iter()
                    .map(|v| format!("\"{v}\""))
                    .collect::<Vec<_>>()
                    .join(" | ")
            ),
            Self::Number => "number".to_string(),
            Self::Integer => "integer".to_string(),
            Self::Boolean => "boolean".to_string(),
            Self::Null => "null".to_string(),
            Self::Array(_) => "array".to_string(),
            Self::Object(_) | Self::OpenObject => "object".to_string(),
            Self::Nullable(inner) => format!("{} or null", inner.expected()),
        }
    }

    fn check(&self, value: &Value, path: &str, out: &mut Vec<Violation>) -> Value {
        let accepted = match (self, value) {
            (Self::Any, _) => true,
            (Self::Nullable(_), Value::Null) => true,
            (Self::Nullable(inner), _) => return inner.check(value, path, out),
            (Self::String, Value::String(_)) => true,
            (Self::Enum(allowed), Value::String(s)) => allowed.iter().any(|a| a == s),
            (Self::Number, Value::Number(_)) => true,
            (Self::Integer, Value::Number(n)) => is_integral(n),
            (Self::Boolean, Value::Bool(_)) => true,
            (Self::Null, Value::Null) => true,
            (Self::OpenObject, Value::Object(_)) => true,
            (Self::Array(items), Value::Array(elements)) => {
                let checked = elements
                    .iter()
                    .enumerate()
                    .map(|(i, element)| items.check(element, &format!("{path}[{i}]"), out))
                    .collect();
                return Value::Array(checked);
            }
            (Self::Object(fields), Value::Object(map)) => {
                return Value::Object(check_fields(fields, map, path, out));
            }
            _ => false,
        };

        if !accepted {
            out.push(Violation {
                path: path.to_string(),
                expected: self.expected(),
                actual: Some(value.clone()),
            });
        }
        value.clone()
    }

    /// Render a JSON Schema equivalent of this validator.
    pub fn to_json_schema(&self) -> Value {
        match self {
            Self::Any => json!({}),
            Self::String => json!({ "type": "string" }),
            Self::Enum(allowed) => json!({ "type": "string", "enum": allowed }),
            Self::Number => json!({ "type": "number" }),
            Self::Integer => json!({ "type": "integer" }),
            Self::Boolean => json!({ "type": "boolean" }),
            Self::Null => json!({ "type": "null" }),
            Self::Array(items) => json!({ "type": "array", "items": items.to_json_schema() }),
            Self::OpenObject => json!({ "type": "object" }),
            Self::Object(fields) => {
                let mut properties = Map::new();
                let mut required = Vec::new();
                for field in fields {
                    let mut schema = field.validator.to_json_schema();
                    if let (Some(description), Value::Object(obj)) =
                        (&field.description, &mut schema)
                    {
                        obj.insert("description".to_string(), json!(description));
                    }
                    properties.insert(field.name.clone(), schema);
                    if field.required {
                        required.push(field.name.clone());
                    }
                }
                let mut schema = json!({ "type": "object", "properties": properties });
                if !required.is_empty() {
                    schema["required"] = json!(required);
                }
                schema
            }
            Self::Nullable(inner) => {
                let mut schema = inner.to_json_schema();
                if let Some(Value::String(kind)) = schema.get("type").cloned() {
                    schema["type"] = json!([kind, "null"]);
                }
                if let Some(Value::Array(allowed)) = schema.get_mut("enum") {
                    allowed.push(Value::Null);
                }
                schema
            }
        }
    }
}

fn check_fields(
    fields: &[FieldValidator],
    map: &Map<String, Value>,
    path: &str,
    out: &mut Vec<Violation>,
) -> Map<String, Value> {
    let mut normalized = Map::new();
    for field in fields {
        let field_path = format!("{path}.{}", field.name);
        match map.get(&field.name) {
            Some(value) => {
                let checked = field.validator.check(value, &field_path, out);
                normalized.insert(field.name.clone(), checked);
            }
            None if field.required => out.push(Violation {
                path: field_path,
                expected: field.validator.expected(),
                actual: None,
            }),
            None => {}
        }
    }
    normalized
}

fn is_integral(n: &serde_json::Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}
