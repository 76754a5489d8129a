use jsonschema::{validator_for, ValidationError as JsonSchemaError};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::GatewayError;
use crate::llm_client::strip_json_fences;
use crate::schema::Shape;

/// Violations beyond this count are summarized rather than listed.
const MAX_REPORTED_VIOLATIONS: usize = 3;

/// Checks a parsed value against a shape declaration.
pub fn validate_shape(value: &Value, shape: &Shape) -> Result<(), GatewayError> {
    let schema = shape.to_json_schema();
    let validator = validator_for(&schema).map_err(|e| {
        GatewayError::SchemaViolation(format!("invalid shape declaration: {e}"))
    })?;

    let violations: Vec<String> = validator.iter_errors(value).map(|e| describe(&e)).collect();
    if violations.is_empty() {
        return Ok(());
    }

    let mut message = violations
        .iter()
        .take(MAX_REPORTED_VIOLATIONS)
        .cloned()
        .collect::<Vec<_>>()
        .join("; ");
    if violations.len() > MAX_REPORTED_VIOLATIONS {
        message.push_str(&format!(
            " (and {} more)",
            violations.len() - MAX_REPORTED_VIOLATIONS
        ));
    }
    Err(GatewayError::SchemaViolation(message))
}

/// Turns raw model text into a typed value: strip fences, parse, check shape, deserialize.
pub fn decode_structured<T: DeserializeOwned>(text: &str, shape: &Shape) -> Result<T, GatewayError> {
    let cleaned = strip_json_fences(text);
    let value: Value = serde_json::from_str(cleaned)
        .map_err(|e| GatewayError::MalformedOutput(format!("invalid JSON: {e}")))?;

    validate_shape(&value, shape)?;

    serde_json::from_value(value).map_err(|e| GatewayError::SchemaViolation(e.to_string()))
}

fn describe(error: &JsonSchemaError) -> String {
    let path = error.instance_path.to_string();
    if path.is_empty() {
        format!("{error} at document root")
    } else {
        format!("{error} at '{path}'")
    }
}
