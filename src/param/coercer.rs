use crate::spec::{Schema, SchemaKind};
use serde_json::{Number, Value};
use thiserror::Error;

/// A string leaf that could not be rewritten into the JSON type its schema
/// demands. `path` is the bracketed parameter path (`card[exp_month]`,
/// `items[0]`), so the message points a client at the offending field.
#[derive(Debug, Error)]
#[error("could not coerce parameter `{path}`: {detail}")]
pub struct CoerceError {
    pub path: String,
    pub detail: String,
}

impl CoerceError {
    fn new(path: &str, detail: impl Into<String>) -> Self {
        CoerceError {
            path: path.to_string(),
            detail: detail.into(),
        }
    }
}

/// Walk a parsed form document in parallel with its request-body schema and
/// convert string leaves into the schema's target types.
///
/// Values already of the target type pass through untouched, as do
/// properties the schema does not mention and values under schemas with no
/// recognized type. The input is consumed and a rewritten tree returned.
pub fn coerce_params(schema: &Schema, data: Value) -> Result<Value, CoerceError> {
    coerce_value(schema, data, "")
}

fn coerce_value(schema: &Schema, value: Value, path: &str) -> Result<Value, CoerceError> {
    match schema.kind() {
        SchemaKind::Integer => coerce_integer(value, path),
        SchemaKind::Number => coerce_number(value, path),
        SchemaKind::Boolean => coerce_boolean(value, path),
        SchemaKind::Array(items) => coerce_array(items, value, path),
        SchemaKind::Object => coerce_object(schema, value, path),
        SchemaKind::AnyOf(branches) | SchemaKind::OneOf(branches) => {
            coerce_branches(branches, value, path)
        }
        // strings, enums, refs, unknown or missing types: hands off
        _ => Ok(value),
    }
}

fn coerce_integer(value: Value, path: &str) -> Result<Value, CoerceError> {
    match value {
        Value::String(s) => match s.parse::<i64>() {
            Ok(n) => Ok(Value::Number(n.into())),
            Err(_) => Err(CoerceError::new(
                path,
                format!("`{s}` is not an integer"),
            )),
        },
        other => Ok(other),
    }
}

fn coerce_number(value: Value, path: &str) -> Result<Value, CoerceError> {
    match value {
        Value::String(s) => {
            let parsed = s
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .ok_or_else(|| CoerceError::new(path, format!("`{s}` is not a number")))?;
            Ok(Value::Number(parsed))
        }
        other => Ok(other),
    }
}

fn coerce_boolean(value: Value, path: &str) -> Result<Value, CoerceError> {
    match value {
        Value::String(s) => {
            if s.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if s.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(CoerceError::new(path, format!("`{s}` is not a boolean")))
            }
        }
        other => Ok(other),
    }
}

fn coerce_array(items: Option<&Schema>, value: Value, path: &str) -> Result<Value, CoerceError> {
    let Some(items) = items else {
        return Ok(value);
    };
    match value {
        Value::Array(list) => {
            let mut out = Vec::with_capacity(list.len());
            for (i, element) in list.into_iter().enumerate() {
                out.push(coerce_value(items, element, &child_path(path, &i.to_string()))?);
            }
            Ok(Value::Array(out))
        }
        // a lone scalar targeting a scalar item type becomes a one-element list
        scalar if !scalar.is_object() && items_are_scalar(items) => {
            Ok(Value::Array(vec![coerce_value(items, scalar, path)?]))
        }
        _ => Err(CoerceError::new(path, "expected a list".to_string())),
    }
}

fn items_are_scalar(items: &Schema) -> bool {
    matches!(
        items.kind(),
        SchemaKind::String
            | SchemaKind::Integer
            | SchemaKind::Number
            | SchemaKind::Boolean
            | SchemaKind::Enum(_)
    )
}

fn coerce_object(schema: &Schema, value: Value, path: &str) -> Result<Value, CoerceError> {
    match value {
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, element) in map {
                let coerced = match schema.properties.get(&key) {
                    Some(property) => {
                        coerce_value(property, element, &child_path(path, &key))?
                    }
                    // unknown properties pass through; the schema is open
                    None => element,
                };
                out.insert(key, coerced);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other),
    }
}

fn coerce_branches(branches: &[Schema], value: Value, path: &str) -> Result<Value, CoerceError> {
    for branch in branches {
        if let Ok(coerced) = coerce_value(branch, value.clone(), path) {
            return Ok(coerced);
        }
    }
    Err(CoerceError::new(
        path,
        "no schema alternative accepted the value".to_string(),
    ))
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}[{key}]")
    }
}
