//! Response synthesis: walk a response schema depth-first and produce a
//! document that conforms to it, seeded from fixture data and shaped by the
//! request's expansion directives.

use crate::expansion::ExpansionLevel;
use crate::spec::{Fixtures, Schema, SchemaKind};
use chrono::Utc;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use thiserror::Error;

const COMPONENT_SCHEMA_PREFIX: &str = "#/components/schemas/";

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("no component schema found for reference `{0}`")]
    UnresolvedRef(String),
    #[error("cannot generate a value for schema type `{0}`")]
    UnsupportedType(String),
}

/// Generates schema-conforming response documents.
///
/// Holds borrowed views of the components catalogue and fixtures; a fresh
/// instance per request is free.
pub struct DataGenerator<'a> {
    schemas: &'a IndexMap<String, Schema>,
    fixtures: &'a Fixtures,
}

impl<'a> DataGenerator<'a> {
    pub fn new(schemas: &'a IndexMap<String, Schema>, fixtures: &'a Fixtures) -> Self {
        DataGenerator { schemas, fixtures }
    }

    /// Produce a document conforming to `schema`.
    ///
    /// `request_path` feeds the `url` field of paginated list objects;
    /// `primary_id`, when present, overwrites the top-level `id` so the
    /// response names the resource the URL addressed. `expansions` selects
    /// which expandable fields render as full objects instead of bare ids.
    pub fn generate(
        &self,
        schema: &Schema,
        request_path: &str,
        primary_id: Option<&str>,
        expansions: Option<&ExpansionLevel>,
    ) -> Result<Value, GenerateError> {
        let mut stack = Vec::new();
        let mut data = self.generate_schema(schema, request_path, expansions, &mut stack)?;

        if let Some(id) = primary_id {
            if let Value::Object(map) = &mut data {
                if map.contains_key("id") || self.schema_has_id_property(schema) {
                    map.insert("id".to_string(), Value::String(id.to_string()));
                }
            }
        }

        Ok(data)
    }

    fn generate_schema(
        &self,
        schema: &Schema,
        request_path: &str,
        expansions: Option<&ExpansionLevel>,
        stack: &mut Vec<String>,
    ) -> Result<Value, GenerateError> {
        match schema.kind() {
            SchemaKind::Ref(target) => {
                let name = target
                    .strip_prefix(COMPONENT_SCHEMA_PREFIX)
                    .unwrap_or(target);
                let resolved = self
                    .schemas
                    .get(name)
                    .ok_or_else(|| GenerateError::UnresolvedRef(target.to_string()))?;
                if stack.iter().any(|seen| seen == name) {
                    // re-entering an ancestor: cut the cycle with the
                    // smallest document the schema allows
                    return Ok(minimal_object(resolved));
                }
                stack.push(name.to_string());
                let result = self.generate_schema(resolved, request_path, expansions, stack);
                stack.pop();
                result
            }
            SchemaKind::AnyOf(branches) | SchemaKind::OneOf(branches) => match branches.first() {
                Some(branch) => self.generate_schema(branch, request_path, expansions, stack),
                None => Ok(Value::Null),
            },
            SchemaKind::Enum(values) => Ok(values.first().cloned().unwrap_or(Value::Null)),
            SchemaKind::Object | SchemaKind::Empty => {
                self.generate_object(schema, request_path, expansions, stack)
            }
            SchemaKind::Array(items) => match items {
                Some(items) => Ok(Value::Array(vec![self.generate_schema(
                    items,
                    request_path,
                    expansions,
                    stack,
                )?])),
                None => Ok(Value::Array(Vec::new())),
            },
            SchemaKind::String => Ok(generate_string(schema)),
            SchemaKind::Integer => Ok(generate_integer(schema)),
            SchemaKind::Number => Ok(json!(0.0)),
            SchemaKind::Boolean => Ok(Value::Bool(false)),
            SchemaKind::Unsupported => Err(GenerateError::UnsupportedType(
                "unrecognized".to_string(),
            )),
        }
    }

    fn generate_object(
        &self,
        schema: &Schema,
        request_path: &str,
        expansions: Option<&ExpansionLevel>,
        stack: &mut Vec<String>,
    ) -> Result<Value, GenerateError> {
        // Paginated lists have a fixed envelope; synthesize one element and
        // point `url` back at the request.
        if let Some(items) = list_items_schema(schema) {
            let child = expansions.and_then(|level| level.children.get("data"));
            let element = self.generate_schema(items, request_path, child, stack)?;
            return Ok(json!({
                "object": "list",
                "data": [element],
                "has_more": false,
                "url": request_path,
            }));
        }

        let fixture = schema
            .resource_id
            .as_deref()
            .and_then(|resource| self.fixtures.get(resource));
        let mut map = match fixture {
            Some(Value::Object(sample)) => sample.clone(),
            _ => Map::new(),
        };
        let has_fixture = matches!(fixture, Some(Value::Object(_)));

        for (name, property) in &schema.properties {
            if schema.is_expandable_field(name) {
                let requested = expansions.is_some_and(|level| level.expands(name));
                let child = expansions.and_then(|level| level.children.get(name.as_str()));

                if requested {
                    let target = expansion_target(property);
                    let value = self.generate_schema(target, request_path, child, stack)?;
                    map.insert(name.clone(), value);
                } else if !map.contains_key(name)
                    && (has_fixture || schema.required.contains(name))
                {
                    // generate the full object anyway, then collapse it to
                    // its id; one code path for both renderings
                    let target = expansion_target(property);
                    let value = self.generate_schema(target, request_path, None, stack)?;
                    map.insert(name.clone(), collapse_to_id(value));
                }
                continue;
            }

            if map.contains_key(name) {
                continue;
            }
            if has_fixture || schema.required.contains(name) {
                let child = expansions.and_then(|level| level.children.get(name.as_str()));
                let value = self.generate_schema(property, request_path, child, stack)?;
                map.insert(name.clone(), value);
            }
        }

        Ok(Value::Object(map))
    }

    fn schema_has_id_property(&self, schema: &Schema) -> bool {
        let mut current = schema;
        let mut hops = 0;
        while let SchemaKind::Ref(target) = current.kind() {
            let name = target
                .strip_prefix(COMPONENT_SCHEMA_PREFIX)
                .unwrap_or(target);
            match self.schemas.get(name) {
                Some(resolved) if hops < 8 => {
                    current = resolved;
                    hops += 1;
                }
                _ => return false,
            }
        }
        current.properties.contains_key("id")
    }
}

/// The schema an expandable property grows into: the first declared
/// expansion resource, or the property schema itself when none is declared.
fn expansion_target(property: &Schema) -> &Schema {
    property
        .expansion_resources
        .as_deref()
        .and_then(|resources| resources.one_of.first())
        .unwrap_or(property)
}

/// An unexpanded expandable field renders as the nested object's id.
fn collapse_to_id(value: Value) -> Value {
    match value {
        Value::Object(map) => map
            .get("id")
            .cloned()
            .unwrap_or(Value::String(String::new())),
        other => other,
    }
}

/// Detect the fixed paginated-list envelope: an `object` property pinned to
/// `"list"` alongside an array-typed `data` property.
fn list_items_schema(schema: &Schema) -> Option<&Schema> {
    let tag = schema.properties.get("object")?;
    if tag.enum_values.first().and_then(Value::as_str) != Some("list") {
        return None;
    }
    match schema.properties.get("data")?.kind() {
        SchemaKind::Array(items) => items,
        _ => None,
    }
}

fn generate_string(schema: &Schema) -> Value {
    match schema.format.as_deref() {
        Some("date-time") | Some("date") => Value::String(Utc::now().to_rfc3339()),
        _ => Value::String(String::new()),
    }
}

fn generate_integer(schema: &Schema) -> Value {
    match schema.format.as_deref() {
        Some("unix-time") => json!(Utc::now().timestamp()),
        _ => json!(0),
    }
}

/// Cycle-guard fallback: the schema's required properties, each filled with
/// a default that needs no recursion.
fn minimal_object(schema: &Schema) -> Value {
    let mut map = Map::new();
    for name in &schema.required {
        let default = schema
            .properties
            .get(name)
            .map(empty_value)
            .unwrap_or(Value::Null);
        map.insert(name.clone(), default);
    }
    Value::Object(map)
}

fn empty_value(schema: &Schema) -> Value {
    match schema.kind() {
        SchemaKind::Enum(values) => values.first().cloned().unwrap_or(Value::Null),
        SchemaKind::String => Value::String(String::new()),
        SchemaKind::Integer => json!(0),
        SchemaKind::Number => json!(0.0),
        SchemaKind::Boolean => Value::Bool(false),
        SchemaKind::Array(_) => Value::Array(Vec::new()),
        _ => Value::Object(Map::new()),
    }
}
