//! Lenient field accessors over JSON objects

use serde_json::Value;

/// Read a field as text
///
/// Strings are returned as-is, numbers and booleans in their JSON rendering.
pub fn string_field(record: &Value, name: &str) -> Option<String> {
    match record.get(name)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Read a field as an integer
///
/// Accepts integers, finite floats (truncated toward zero) and numeric strings.
pub fn int_field(record: &Value, name: &str) -> Option<i64> {
    match record.get(name)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    }
}

/// Read a field as a float
///
/// Accepts any JSON number and numeric strings.
pub fn float_field(record: &Value, name: &str) -> Option<f64> {
    match record.get(name)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}
