//! Schema translation: [`InterfaceSchema`] to [`Validator`].
//!
//! Translation is total. Malformed or unknown nodes degrade to
//! [`Validator::Any`], so a bad upstream schema never blocks the catalog;
//! the upstream itself gets the final say on such arguments.
//!
//! Unions are simplified: `T | null` becomes a nullable `T`, and any other
//! multi-member union is checked against its first member only.

use super::schema::{InterfaceSchema, SchemaKind};
use super::validator::{FieldValidator, Validator};

/// Translate a schema node into a validator.
pub fn translate(schema: &InterfaceSchema) -> Validator {
    let validator = match &schema.kind {
        SchemaKind::Any => Validator::Any,
        SchemaKind::String { allowed: None } => Validator::String,
        SchemaKind::String {
            allowed: Some(allowed),
        } => Validator::Enum(allowed.clone()),
        SchemaKind::Number => Validator::Number,
        SchemaKind::Integer => Validator::Integer,
        SchemaKind::Boolean => Validator::Boolean,
        SchemaKind::Null => Validator::Null,
        SchemaKind::Array { items } => Validator::Array(Box::new(
            items.as_deref().map(translate).unwrap_or(Validator::Any),
        )),
        SchemaKind::Object { properties, .. } if properties.is_empty() => Validator::OpenObject,
        SchemaKind::Object {
            properties,
            required,
        } => Validator::Object(
            properties
                .iter()
                .map(|(name, property)| FieldValidator {
                    name: name.clone(),
                    required: required.contains(name),
                    description: property.description.clone(),
                    validator: translate(property),
                })
                .collect(),
        ),
        SchemaKind::Union(members) => translate_union(members),
    };

    if schema.nullable {
        validator.nullable()
    } else {
        validator
    }
}

fn translate_union(members: &[InterfaceSchema]) -> Validator {
    let non_null: Vec<&InterfaceSchema> = members.iter().filter(|m| !m.is_null()).collect();
    let has_null = non_null.len() < members.len();

    match (has_null, non_null.as_slice()) {
        (true, [only]) => translate(only).nullable(),
        _ => members.first().map(translate).unwrap_or(Validator::Any),
    }
}
