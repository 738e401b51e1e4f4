use serde_json::{Map, Number, Value};

use crate::formats::integer_prefix;

/// Text of a value that counts as present: a non-empty string, a non-zero
/// number or `true`. Anything else reads as absent.
pub fn present_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        Value::Number(number) if !is_zero(number) => Some(number.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

/// Length from a positive number or any non-empty string.
///
/// Numeric zero reads as absent. A non-empty string is present even when it
/// reads as 0 (`"0"`, `"n/a"`); its value is its leading integer.
pub fn present_length(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number_to_u64(number).filter(|length| *length > 0),
        Value::String(text) if !text.is_empty() => Some(integer_prefix(text)),
        _ => None,
    }
}

/// Integer from the leading digits of a value, 0 when there are none.
pub fn leading_integer(value: &Value) -> u64 {
    match value {
        Value::Number(number) => number_to_u64(number).unwrap_or(0),
        Value::String(text) => integer_prefix(text),
        _ => 0,
    }
}

/// First alias whose value reads as present.
pub fn first_present<T>(
    fields: &Map<String, Value>,
    aliases: &[&str],
    read: fn(&Value) -> Option<T>,
) -> Option<T> {
    aliases
        .iter()
        .find_map(|alias| fields.get(*alias).and_then(read))
}

pub fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(present_text)
}

/// Nested object under `key`; a missing or non-object value reads as empty.
pub fn object_field(fields: &Map<String, Value>, key: &str) -> Map<String, Value> {
    fields
        .get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn number_to_u64(number: &Number) -> Option<u64> {
    number.as_u64().or_else(|| {
        number
            .as_f64()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .map(|value| value as u64)
    })
}

fn is_zero(number: &Number) -> bool {
    number.as_f64() == Some(0.0)
}
