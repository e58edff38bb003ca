//! Field access over JSON records.
//!
//! The engine itself is generic over the record type. Most callers feed it
//! JSON objects straight from the backend, so this module provides the
//! accessors they need to build search fields, filters and key extractors.

use crate::RecordKey;
use serde_json::Value;

/// A JSON record as returned by the backend.
pub type Record = Value;

/// Resolve a dotted path (`"vendor.name"`) through nested objects.
///
/// Returns `None` when any segment is missing or the final value is null.
pub fn field<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = record;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    match current {
        Value::Null => None,
        value => Some(value),
    }
}

/// Render the value at `path` as searchable text.
///
/// Strings are returned verbatim, numbers and booleans use their JSON
/// rendering. Arrays and objects have no text form.
pub fn field_text(record: &Value, path: &str) -> Option<String> {
    match field(record, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Extract the identity of a record from `path`, empty when absent.
pub fn key_of(record: &Value, path: &str) -> RecordKey {
    field_text(record, path).unwrap_or_default()
}

/// Human readable name of a JSON value's type, for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn trip() -> Value {
        json!({
            "_id": "trip-1",
            "vehicleNumber": "MH12AB1234",
            "loadWeight": 1520.5,
            "isActive": true,
            "vendor": {"name": "Acme Logistics", "address": null},
            "tags": ["night", "heavy"]
        })
    }

    #[test]
    fn top_level_field() {
        let record = trip();
        assert_eq!(
            field(&record, "vehicleNumber"),
            Some(&json!("MH12AB1234"))
        );
        assert_eq!(field(&record, "missing"), None);
    }

    #[test]
    fn nested_field() {
        let record = trip();
        assert_eq!(
            field_text(&record, "vendor.name").as_deref(),
            Some("Acme Logistics")
        );
        assert_eq!(field(&record, "vendor.address"), None);
        assert_eq!(field(&record, "vendor.name.first"), None);
    }

    #[test]
    fn scalar_text_rendering() {
        let record = trip();
        assert_eq!(field_text(&record, "loadWeight").as_deref(), Some("1520.5"));
        assert_eq!(field_text(&record, "isActive").as_deref(), Some("true"));
        assert_eq!(field_text(&record, "tags"), None);
        assert_eq!(field_text(&record, "vendor"), None);
    }

    #[test]
    fn record_key() {
        let record = trip();
        assert_eq!(key_of(&record, "_id"), "trip-1");
        assert_eq!(key_of(&json!({"name": "x"}), "_id"), "");
        assert_eq!(key_of(&json!({"id": 42}), "id"), "42");
    }

    #[test]
    fn non_object_root() {
        assert_eq!(field(&json!("plain"), "name"), None);
        assert_eq!(field(&json!([1, 2]), "0"), None);
    }

    #[test]
    fn type_names() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!({"a": 1})), "object");
        assert_eq!(json_type_name(&json!("s")), "string");
    }
}
