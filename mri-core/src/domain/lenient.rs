//! Serde helpers for loosely typed upstream fields
//!
//! MRI returns identifiers and phone numbers as numbers or strings depending
//! on the endpoint, so anything scalar is accepted and turned into text.

use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// Text form of a JSON value, `None` for null
pub fn value_to_text(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Deserialize an optional field that may be a number, string or null
pub fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<JsonValue> = Option::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_text))
}
