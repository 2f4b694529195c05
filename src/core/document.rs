use crate::core::{GuardError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use uuid::Uuid;

/// An in-memory document instance bound for a store collection.
///
/// Tracks, per top-level field, whether the value changed since the last
/// persisted state, and whether the document has a persisted identity at
/// all. Both inputs drive the validation pass: modification state limits
/// which fields are probed, and the identity (when present) is excluded
/// from duplicate queries so a document never conflicts with itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: Option<Uuid>,
    body: Map<String, Value>,
    modified: BTreeSet<String>,
}

impl Document {
    /// Create a new, never-persisted document. Every present field counts
    /// as modified.
    pub fn new(body: Value) -> Result<Self> {
        let body = into_object(body)?;
        let modified = body.keys().cloned().collect();
        Ok(Self {
            id: None,
            body,
            modified,
        })
    }

    /// Rehydrate a document that already exists in the store. No field is
    /// modified until a setter runs.
    pub fn persisted(id: Uuid, body: Value) -> Result<Self> {
        Ok(Self {
            id: Some(id),
            body: into_object(body)?,
            modified: BTreeSet::new(),
        })
    }

    pub fn id(&self) -> Option<Uuid> {
        self.id
    }

    /// True when the document has no persisted identity yet.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.body.get(field)
    }

    /// Like [`get`](Self::get), but treats JSON null as absent. Probe
    /// filters are built from this view: a null field can never collide.
    pub fn value_of(&self, field: &str) -> Option<&Value> {
        self.body.get(field).filter(|v| !v.is_null())
    }

    /// Set a field value and mark it modified.
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        let field = field.into();
        self.modified.insert(field.clone());
        self.body.insert(field, value);
    }

    pub fn is_modified(&self, field: &str) -> bool {
        self.modified.contains(field)
    }

    pub fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Flip the document into its post-persist state: identity assigned,
    /// modification slate wiped.
    pub fn mark_persisted(&mut self, id: Uuid) {
        self.id = Some(id);
        self.modified.clear();
    }
}

fn into_object(body: Value) -> Result<Map<String, Value>> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err(GuardError::InvalidDocument(format!(
            "Expected a JSON object, got {}",
            type_name(&other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
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

    #[test]
    fn test_new_document_marks_all_fields_modified() {
        let doc = Document::new(json!({ "email": "a@b.com", "age": 22 })).unwrap();
        assert!(doc.is_new());
        assert!(doc.is_modified("email"));
        assert!(doc.is_modified("age"));
        assert!(!doc.is_modified("color"));
    }

    #[test]
    fn test_persisted_document_starts_clean() {
        let id = Uuid::new_v4();
        let mut doc = Document::persisted(id, json!({ "email": "a@b.com" })).unwrap();
        assert!(!doc.is_new());
        assert!(!doc.is_modified("email"));

        doc.set("email", json!("b@c.com"));
        assert!(doc.is_modified("email"));
    }

    #[test]
    fn test_value_of_treats_null_as_absent() {
        let doc = Document::new(json!({ "color": null, "age": 0 })).unwrap();
        assert!(doc.value_of("color").is_none());
        assert_eq!(doc.value_of("age"), Some(&json!(0)));
    }

    #[test]
    fn test_rejects_non_object_bodies() {
        assert!(Document::new(json!([1, 2])).is_err());
        assert!(Document::new(json!("text")).is_err());
    }
}
