//! CLI command handlers

pub mod ask;
pub mod query;
pub mod schema;
pub mod status;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

/// Parse a JSON object given inline or as `@path`
pub fn read_body(arg: &str) -> Result<Map<String, Value>> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request body from {}", path))?,
        None => arg.to_string(),
    };

    let value: Value = serde_json::from_str(&text).context("Request body is not valid JSON")?;
    match value {
        Value::Object(map) => Ok(map),
        other => bail!("Request body must be a JSON object, got {}", type_name(&other)),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
