use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::Collection;
use crate::core::Result;

/// In-memory document store. Collections are created on first access and
/// shared between handles, so every caller sees the same data.
pub struct DocumentStore {
    collections: RwLock<HashMap<String, Arc<Collection>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Get a handle to a collection, creating it if it does not exist yet.
    pub fn collection(&self, name: &str) -> Result<Arc<Collection>> {
        if let Some(existing) = self.collections.read()?.get(name) {
            return Ok(Arc::clone(existing));
        }

        let mut collections = self.collections.write()?;
        let entry = collections
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Collection::new(name)));
        Ok(Arc::clone(entry))
    }

    /// Names of the collections created so far, sorted.
    pub fn collection_names(&self) -> Result<Vec<String>> {
        let collections = self.collections.read()?;
        let mut names: Vec<String> = collections.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}
