// One-level structural summary of a decoded JSON value

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Longest scalar sample kept per field.
pub const SAMPLE_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeSummary {
    pub value_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_item_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_item_keys: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sample: BTreeMap<String, String>,
}

pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Summarize `value` without recursing: object keys keep their order of
/// appearance and nested containers are reported as `"{type} with {n} items"`.
pub fn summarize(value: &Value) -> ShapeSummary {
    let mut summary = ShapeSummary {
        value_type: type_name(value).to_string(),
        keys: None,
        length: None,
        first_item_type: None,
        first_item_keys: None,
        sample: BTreeMap::new(),
    };

    match value {
        Value::Object(map) => {
            summary.keys = Some(map.keys().cloned().collect());
            for (key, field) in map {
                summary.sample.insert(key.clone(), sample_value(field));
            }
        }
        Value::Array(items) => {
            summary.length = Some(items.len());
            if let Some(first) = items.first() {
                summary.first_item_type = Some(type_name(first).to_string());
                if let Value::Object(map) = first {
                    summary.first_item_keys = Some(map.keys().cloned().collect());
                }
            }
        }
        _ => {}
    }

    summary
}

/// One-line preview of a field value.
pub fn sample_value(value: &Value) -> String {
    match value {
        Value::Object(map) => format!("object with {} items", map.len()),
        Value::Array(items) => format!("array with {} items", items.len()),
        Value::String(s) => truncate(s, SAMPLE_LIMIT),
        other => truncate(&other.to_string(), SAMPLE_LIMIT),
    }
}

fn truncate(s: &str, limit: usize) -> String {
    s.chars().take(limit).collect()
}
