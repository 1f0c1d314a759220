//! JSON value helpers.

use crate::numeric::integral_number;
use serde_json::{Map, Value};

/// Collected form values: section name → {field name → value}.
pub type SectionValues = Map<String, Value>;

/// Normalise a collected value for the output document.
///
/// Booleans become `"true"`/`"false"`, null becomes `""`, integral floats
/// become integers, containers are normalised recursively.
pub fn stringify_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, val)| (key.clone(), stringify_value(val)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(stringify_value).collect()),
        Value::Bool(flag) => Value::String(bool_text(*flag).to_string()),
        Value::Null => Value::String(String::new()),
        Value::Number(number) => match number.as_f64() {
            Some(v) if number.is_f64() => {
                integral_number(v).map_or_else(|| value.clone(), Value::Number)
            }
            _ => value.clone(),
        },
        Value::String(_) => value.clone(),
    }
}

fn bool_text(flag: bool) -> &'static str {
    if flag { "true" } else { "false" }
}

/// `true` for values that mean "not specified": null and the empty string.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Truthiness in the loose sense used for optional document entries: empty
/// strings, zero, `false`, null and empty containers are all false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Display text of a scalar value, as an edit box would show it.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(flag) => bool_text(*flag).to_string(),
        Value::Number(number) => number.to_string(),
        other => other.to_string(),
    }
}

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Look up `key` ignoring ASCII and Unicode case. Null entries count as absent.
pub fn case_insensitive_get<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    let target = key.to_lowercase();
    map.iter()
        .find(|(candidate, _)| candidate.to_lowercase() == target)
        .map(|(_, value)| value)
        .filter(|value| !value.is_null())
}
