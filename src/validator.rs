//! Request-body validation against JSON-Schema-derived validators.
//!
//! Validators are compiled once per operation when the routing table is
//! built, never per request. A schema the `jsonschema` crate cannot compile
//! simply yields no validator; that operation skips validation rather than
//! failing at startup.

use crate::spec::{Components, Schema};
use jsonschema::JSONSchema;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// A request body the validator rejected, reduced to the first reported
/// violation and the JSON pointer it occurred at.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ValidationFailure {
    pub message: String,
}

/// Compile a validator for a form-encoded request-body schema.
///
/// The schema is serialized with the components catalogue spliced in at the
/// document root, so `#/components/schemas/<Name>` references resolve
/// exactly as they do in the source document.
pub fn compile_request_validator(schema: &Schema, components: &Components) -> Option<JSONSchema> {
    let mut document = match serde_json::to_value(schema) {
        Ok(Value::Object(map)) => map,
        _ => return None,
    };
    let schemas = serde_json::to_value(&components.schemas).ok()?;
    document.insert(
        "components".to_string(),
        serde_json::json!({ "schemas": schemas }),
    );

    match JSONSchema::compile(&Value::Object(document)) {
        Ok(compiled) => Some(compiled),
        Err(err) => {
            debug!(error = %err, "request body schema produced no validator; skipping validation");
            None
        }
    }
}

/// Check coerced request data against a compiled validator.
pub fn validate(validator: &JSONSchema, data: &Value) -> Result<(), ValidationFailure> {
    match validator.validate(data) {
        Ok(()) => Ok(()),
        Err(mut errors) => {
            let message = match errors.next() {
                Some(err) => {
                    let pointer = err.instance_path.to_string();
                    if pointer.is_empty() {
                        err.to_string()
                    } else {
                        format!("{err} (at `{pointer}`)")
                    }
                }
                None => "request body failed validation".to_string(),
            };
            Err(ValidationFailure { message })
        }
    }
}
