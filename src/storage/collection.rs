use std::collections::BTreeMap;
use std::sync::RwLock;

use serde_json::{Map, Value};

use super::update::{UpdateOutcome, UpdateSpec, type_name};
use crate::core::{DocumentId, Result, StoreError};

/// Field the store writes the generated identifier into on insert.
pub const ID_FIELD: &str = "id";

/// A single named collection of JSON documents.
///
/// Every document is an object keyed by a generated [`DocumentId`], which is
/// also embedded in the document's `id` field. Single-document updates are
/// atomic: the whole update spec is applied under the collection write lock,
/// and a failed update leaves the stored document untouched.
pub struct Collection {
    name: String,
    rows: RwLock<BTreeMap<DocumentId, Map<String, Value>>>,
}

impl Collection {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert a document, generating and embedding its identifier.
    pub fn insert(&self, document: Value) -> Result<DocumentId> {
        let mut body = match document {
            Value::Object(map) => map,
            other => {
                return Err(StoreError::TypeMismatch(format!(
                    "collection '{}' only stores objects, got {}",
                    self.name,
                    type_name(&other)
                )));
            }
        };
        let id = DocumentId::generate();
        body.insert(ID_FIELD.to_string(), Value::String(id.to_string()));

        let mut rows = self.rows.write()?;
        rows.insert(id, body);
        Ok(id)
    }

    /// Point lookup.
    pub fn find(&self, id: &DocumentId) -> Result<Option<Value>> {
        let rows = self.rows.read()?;
        Ok(rows.get(id).cloned().map(Value::Object))
    }

    /// Apply a partial update to one document.
    pub fn update(&self, id: &DocumentId, spec: &UpdateSpec) -> Result<UpdateOutcome> {
        let mut rows = self.rows.write()?;
        let Some(body) = rows.get_mut(id) else {
            return Ok(UpdateOutcome {
                matched: false,
                modified: false,
            });
        };

        let mut draft = body.clone();
        let modified = spec.apply(&mut draft)?;
        if modified {
            *body = draft;
        }
        Ok(UpdateOutcome {
            matched: true,
            modified,
        })
    }

    /// Point delete. Returns whether a document was removed.
    pub fn remove(&self, id: &DocumentId) -> Result<bool> {
        let mut rows = self.rows.write()?;
        Ok(rows.remove(id).is_some())
    }

    /// All documents whose top-level `field` equals `value`.
    pub fn scan_eq(&self, field: &str, value: &Value) -> Result<Vec<Value>> {
        let rows = self.rows.read()?;
        Ok(rows
            .values()
            .filter(|body| body.get(field) == Some(value))
            .cloned()
            .map(Value::Object)
            .collect())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.rows.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.rows.read()?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_embeds_id() {
        let collection = Collection::new("things");
        let id = collection.insert(json!({"name": "a"})).unwrap();

        let doc = collection.find(&id).unwrap().unwrap();
        assert_eq!(doc[ID_FIELD], json!(id.to_string()));
        assert_eq!(doc["name"], json!("a"));
    }

    #[test]
    fn test_insert_rejects_non_objects() {
        let collection = Collection::new("things");
        assert!(matches!(
            collection.insert(json!([1, 2, 3])),
            Err(StoreError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_update_missing_document_matches_nothing() {
        let collection = Collection::new("things");
        let outcome = collection
            .update(&DocumentId::generate(), &UpdateSpec::new().set("a", json!(1)))
            .unwrap();
        assert!(!outcome.matched);
        assert!(!outcome.modified);
    }

    #[test]
    fn test_failed_update_leaves_document_untouched() {
        let collection = Collection::new("things");
        let id = collection
            .insert(json!({"name": "a", "tags": "not-a-list"}))
            .unwrap();

        // The set would apply, but the push fails; nothing must stick.
        let spec = UpdateSpec::new()
            .set("name", json!("b"))
            .push("tags", json!("x"));
        assert!(collection.update(&id, &spec).is_err());

        let doc = collection.find(&id).unwrap().unwrap();
        assert_eq!(doc["name"], json!("a"));
        assert_eq!(doc["tags"], json!("not-a-list"));
    }

    #[test]
    fn test_remove_reports_presence() {
        let collection = Collection::new("things");
        let id = collection.insert(json!({"name": "a"})).unwrap();

        assert!(collection.remove(&id).unwrap());
        assert!(!collection.remove(&id).unwrap());
        assert!(collection.find(&id).unwrap().is_none());
    }

    #[test]
    fn test_scan_eq_filters_by_field() {
        let collection = Collection::new("things");
        collection.insert(json!({"owner": "a", "n": 1})).unwrap();
        collection.insert(json!({"owner": "b", "n": 2})).unwrap();
        collection.insert(json!({"owner": "a", "n": 3})).unwrap();

        let matches = collection.scan_eq("owner", &json!("a")).unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|doc| doc["owner"] == json!("a")));
    }
}
