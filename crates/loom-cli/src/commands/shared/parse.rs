use anyhow::Context;
use serde::de::DeserializeOwned;

/// Parse a snake_case CLI value into a serde enum.
pub fn parse_enum<T: DeserializeOwned>(value: &str, field: &str) -> anyhow::Result<T> {
    serde_json::from_value(serde_json::Value::String(value.to_string()))
        .with_context(|| format!("invalid {field}: '{value}'"))
}
