pub mod grades;
pub mod homework;
pub mod schedule;
pub mod subjects;

use serde_json::Value;

/// Text form of a value read from a hand-editable document.
///
/// Strings are trimmed, `null` becomes empty, anything else is rendered as
/// its JSON text (so `5` reads as `"5"` and `true` as `"true"`). A plain
/// string conversion would give `"None"` for `null`; here it is an empty slot.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string().trim().to_string(),
    }
}
