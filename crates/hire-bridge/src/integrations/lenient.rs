//! Deserializers for vendor payloads that are loose about their types.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Treat an explicit `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Identifiers arrive as `"123"` from some endpoints and `123` from others.
pub(crate) fn optional_string_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_to_string))
}

pub(crate) fn optional_u64_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_u64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid id {number}"))),
        Some(Value::String(raw)) if raw.trim().is_empty() => Ok(None),
        Some(Value::String(raw)) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid id '{raw}'"))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected numeric id, found {other}"
        ))),
    }
}

/// Render a scalar JSON value as text; containers and `null` yield `None`.
/// Webhook relays sometimes wrap the event in `{"body": ...}`. Only the inner
/// value is decoded then, so a bad field inside it is reported instead of
/// falling back to the outer object.
pub(crate) fn webhook_body(payload: Value) -> Value {
    match payload {
        Value::Object(mut map) if map.contains_key("body") => {
            map.remove("body").unwrap_or(Value::Null)
        }
        other => other,
    }
}

pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Text for a loosely typed answer: trimmed strings, numbers, and arrays
/// joined with `", "`. Empty results count as missing.
pub(crate) fn text_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(scalar_to_string)
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        other => scalar_to_string(other)?.trim().to_string(),
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
