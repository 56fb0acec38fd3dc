use serde_json::{Map, Value};

use crate::core::{Result, StoreError};

/// Partial update applied atomically to a single document.
///
/// Covers the operations the data-access layers need: plain field sets,
/// nested-map-key sets, list append, and list remove-by-value. The optional
/// `touch` field is refreshed only when one of the other operations actually
/// changed the document, so a no-op update never advances timestamps.
#[derive(Debug, Clone, Default)]
pub struct UpdateSpec {
    sets: Vec<(String, Value)>,
    key_sets: Vec<(String, String, Value)>,
    pushes: Vec<(String, Value)>,
    pulls: Vec<(String, Value)>,
    touch: Option<(String, Value)>,
}

/// Result of applying an [`UpdateSpec`] to a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// A document with the given id exists.
    pub matched: bool,
    /// The document content changed.
    pub modified: bool,
}

impl UpdateSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a top-level field.
    pub fn set(mut self, field: impl Into<String>, value: Value) -> Self {
        self.sets.push((field.into(), value));
        self
    }

    /// Set one key inside a map-valued field, creating the map if absent.
    pub fn set_key(
        mut self,
        field: impl Into<String>,
        key: impl Into<String>,
        value: Value,
    ) -> Self {
        self.key_sets.push((field.into(), key.into(), value));
        self
    }

    /// Append a value to a list-valued field, creating the list if absent.
    pub fn push(mut self, field: impl Into<String>, value: Value) -> Self {
        self.pushes.push((field.into(), value));
        self
    }

    /// Remove every occurrence of `value` from a list-valued field.
    ///
    /// An absent field is a no-op, not an error.
    pub fn pull(mut self, field: impl Into<String>, value: Value) -> Self {
        self.pulls.push((field.into(), value));
        self
    }

    /// Refresh `field` to `value` if any other operation modified the document.
    pub fn touch(mut self, field: impl Into<String>, value: Value) -> Self {
        self.touch = Some((field.into(), value));
        self
    }

    /// Apply all operations to a document body in order: sets, key sets,
    /// pushes, pulls. Returns whether the body changed.
    pub(crate) fn apply(&self, body: &mut Map<String, Value>) -> Result<bool> {
        let before = body.clone();

        for (field, value) in &self.sets {
            body.insert(field.clone(), value.clone());
        }

        for (field, key, value) in &self.key_sets {
            let slot = body
                .entry(field.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            match slot {
                Value::Object(map) => {
                    map.insert(key.clone(), value.clone());
                }
                other => {
                    return Err(StoreError::TypeMismatch(format!(
                        "cannot set key '{}' on {} field '{}'",
                        key,
                        type_name(other),
                        field
                    )));
                }
            }
        }

        for (field, value) in &self.pushes {
            let slot = body
                .entry(field.clone())
                .or_insert_with(|| Value::Array(Vec::new()));
            match slot {
                Value::Array(items) => items.push(value.clone()),
                other => {
                    return Err(StoreError::TypeMismatch(format!(
                        "cannot push to {} field '{}'",
                        type_name(other),
                        field
                    )));
                }
            }
        }

        for (field, value) in &self.pulls {
            match body.get_mut(field) {
                None => {}
                Some(Value::Array(items)) => items.retain(|item| item != value),
                Some(other) => {
                    return Err(StoreError::TypeMismatch(format!(
                        "cannot pull from {} field '{}'",
                        type_name(other),
                        field
                    )));
                }
            }
        }

        let modified = *body != before;
        if modified {
            if let Some((field, value)) = &self.touch {
                body.insert(field.clone(), value.clone());
            }
        }
        Ok(modified)
    }
}

pub(crate) fn type_name(value: &Value) -> &'static str {
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

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test body must be an object"),
        }
    }

    #[test]
    fn test_set_replaces_field() {
        let mut doc = body(json!({"name": "old"}));
        let spec = UpdateSpec::new().set("name", json!("new"));
        assert!(spec.apply(&mut doc).unwrap());
        assert_eq!(doc["name"], json!("new"));
    }

    #[test]
    fn test_set_same_value_is_not_a_modification() {
        let mut doc = body(json!({"name": "same"}));
        let spec = UpdateSpec::new().set("name", json!("same"));
        assert!(!spec.apply(&mut doc).unwrap());
    }

    #[test]
    fn test_set_key_creates_map() {
        let mut doc = body(json!({}));
        let spec = UpdateSpec::new().set_key("columns", "amount", json!("float"));
        assert!(spec.apply(&mut doc).unwrap());
        assert_eq!(doc["columns"], json!({"amount": "float"}));
    }

    #[test]
    fn test_set_key_on_scalar_is_an_error() {
        let mut doc = body(json!({"columns": 42}));
        let spec = UpdateSpec::new().set_key("columns", "amount", json!("float"));
        assert!(matches!(
            spec.apply(&mut doc),
            Err(StoreError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_push_appends_and_creates_list() {
        let mut doc = body(json!({}));
        let spec = UpdateSpec::new().push("versions", json!("v1"));
        assert!(spec.apply(&mut doc).unwrap());
        let spec = UpdateSpec::new().push("versions", json!("v1"));
        assert!(spec.apply(&mut doc).unwrap());
        assert_eq!(doc["versions"], json!(["v1", "v1"]));
    }

    #[test]
    fn test_pull_removes_all_occurrences() {
        let mut doc = body(json!({"versions": ["v1", "v2", "v1"]}));
        let spec = UpdateSpec::new().pull("versions", json!("v1"));
        assert!(spec.apply(&mut doc).unwrap());
        assert_eq!(doc["versions"], json!(["v2"]));
    }

    #[test]
    fn test_pull_miss_is_not_a_modification() {
        let mut doc = body(json!({"versions": ["v2"]}));
        let spec = UpdateSpec::new().pull("versions", json!("v1"));
        assert!(!spec.apply(&mut doc).unwrap());
        assert_eq!(doc["versions"], json!(["v2"]));
    }

    #[test]
    fn test_touch_applies_only_on_modification() {
        let mut doc = body(json!({"name": "same", "updated_at": "t0"}));

        let spec = UpdateSpec::new()
            .set("name", json!("same"))
            .touch("updated_at", json!("t1"));
        assert!(!spec.apply(&mut doc).unwrap());
        assert_eq!(doc["updated_at"], json!("t0"));

        let spec = UpdateSpec::new()
            .set("name", json!("changed"))
            .touch("updated_at", json!("t1"));
        assert!(spec.apply(&mut doc).unwrap());
        assert_eq!(doc["updated_at"], json!("t1"));
    }
}
