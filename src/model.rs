// Task record and field-error types shared by the client, server, and UI.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field name → message mapping returned by the server when validation fails.
/// An absent entry means the field passed validation.
pub type FieldErrors = BTreeMap<String, String>;

/// An open task record: field name → JSON value.
///
/// The client treats tasks as opaque beyond the server-assigned `id`, so
/// server-side schema changes never break it. A record without an `id` is a
/// draft (an unsaved task built by the creation view).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskRecord {
    fields: Map<String, Value>,
}

impl TaskRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Server-assigned identifier, if this record has been saved.
    pub fn id(&self) -> Option<i64> {
        self.fields.get("id").and_then(Value::as_i64)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// String view of a field. Empty for missing or non-string values.
    pub fn text(&self, field: &str) -> &str {
        self.fields.get(field).and_then(Value::as_str).unwrap_or("")
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl From<Map<String, Value>> for TaskRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_serializes_transparently() {
        let mut record = TaskRecord::new();
        record.set("id", 7);
        record.set("title", "write docs");

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({"id": 7, "title": "write docs"}));

        let back: TaskRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn id_absent_on_draft() {
        let mut draft = TaskRecord::new();
        draft.set("title", "no id yet");
        assert_eq!(draft.id(), None);

        draft.set("id", 42);
        assert_eq!(draft.id(), Some(42));
    }

    #[test]
    fn text_is_empty_for_missing_or_non_string() {
        let mut record = TaskRecord::new();
        record.set("count", 3);
        assert_eq!(record.text("count"), "");
        assert_eq!(record.text("missing"), "");

        record.set("title", "present");
        assert_eq!(record.text("title"), "present");
    }

    #[test]
    fn clear_discards_all_fields() {
        let mut record = TaskRecord::new();
        record.set("id", 1);
        record.set("title", "x");
        record.clear();
        assert!(record.is_empty());
        assert_eq!(record.id(), None);
    }
}
