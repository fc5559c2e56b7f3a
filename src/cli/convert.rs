//! Value -> serde_json conversion

use serde_json::{Map, Number};

use crate::{output::extended_wrapper, Value};

/// Convert a translated value to `serde_json::Value` in relaxed extended JSON.
///
/// Decimals, datetimes and non-finite doubles become the same wrapper objects
/// [`crate::output`] prints.
pub fn to_json_value(value: Value) -> serde_json::Value {
    if let Some((key, text)) = extended_wrapper(&value) {
        let mut map = Map::new();
        map.insert(key.to_string(), serde_json::Value::String(text));
        return serde_json::Value::Object(map);
    }

    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(b),
        Value::Integer(i) => serde_json::Value::Number(i.into()),
        Value::Double(f) => Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s),
        Value::Array(arr) => serde_json::Value::Array(arr.into_iter().map(to_json_value).collect()),
        Value::Document(doc) => serde_json::Value::Object(
            doc.into_iter()
                .map(|(k, v)| (k, to_json_value(v)))
                .collect(),
        ),
        // Wrapped above.
        Value::Decimal(_) | Value::DateTime(_) => serde_json::Value::Null,
    }
}
