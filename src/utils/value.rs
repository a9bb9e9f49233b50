use serde_json::Value;

/// Convert arbitrary JSON values into sanitized strings for query-string
/// serialization and error rendering.
pub fn value_to_string(value: Value) -> String {
    let raw = match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    };
    sanitize(raw)
}

fn sanitize(s: String) -> String {
    s.chars().filter(|c| !c.is_control()).collect()
}
