use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::coerce_text;

/// Reads a stored subject list item by item. Scalars are coerced to text;
/// `null`, lists and objects are skipped. Returns `None` only when the
/// document is not a JSON list.
pub fn subject_list_from_json(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    let subjects = items
        .iter()
        .filter_map(|item| match item {
            Value::Null | Value::Array(_) | Value::Object(_) => {
                warn!(item = %item, "skipping unreadable subject entry");
                None
            }
            other => Some(coerce_text(other)),
        })
        .collect();
    Some(subjects)
}

/// Body for PUT /subjects and PUT /hidden-subjects (replace the whole list).
#[derive(Debug, Deserialize)]
pub struct SubjectsPayload {
    pub subjects: Vec<String>,
}

/// Body for POST /subjects and PUT /subjects/{name}.
#[derive(Debug, Deserialize)]
pub struct SubjectNameRequest {
    #[serde(default)]
    pub name: String,
}
