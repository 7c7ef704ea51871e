//! Text encoding of structured payloads.

use serde_json::Value;

/// Format an input/output payload as element body text.
///
/// Strings are used verbatim, arrays are formatted item by item and joined
/// with newlines, everything else becomes compact JSON.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(format_value).collect::<Vec<_>>().join("\n"),
        other => other.to_string(),
    }
}
