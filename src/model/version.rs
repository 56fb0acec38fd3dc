use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};

use crate::core::{DocumentId, Result, time};
use crate::storage::{Collection, DocumentStore};

/// Collection holding the version records.
pub const VERSION_COLLECTION: &str = "transaction_versions";

/// Identifier of one revision of a processed file.
///
/// Opaque to this crate: transactions carry these by value and resolve them
/// through a [`VersionLookup`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionId(String);

impl VersionId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl From<String> for VersionId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl From<DocumentId> for VersionId {
    fn from(id: DocumentId) -> Self {
        Self(id.to_string())
    }
}

/// One revision of a processed file and where it is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub id: DocumentId,
    pub files_path: String,
    pub created_at: DateTime<Utc>,
}

/// Lookup contract the repository consumes to resolve file locations.
pub trait VersionLookup: Send + Sync {
    fn version(&self, id: &VersionId) -> Option<VersionRecord>;
}

#[derive(Debug, Serialize)]
struct NewVersion<'a> {
    files_path: &'a str,
    created_at: DateTime<Utc>,
}

/// Store-backed version directory.
///
/// Store errors are caught here, logged, and collapsed into `None`, the
/// same policy the transaction repository follows.
pub struct VersionDirectory {
    collection: Arc<Collection>,
}

impl VersionDirectory {
    pub fn new(store: &DocumentStore) -> Result<Self> {
        Ok(Self {
            collection: store.collection(VERSION_COLLECTION)?,
        })
    }

    /// Record a new version and return its identifier.
    pub fn create(&self, files_path: &str) -> Option<VersionId> {
        match self.try_create(files_path) {
            Ok(id) => Some(id),
            Err(err) => {
                error!("Database error while creating version: {err}");
                None
            }
        }
    }

    fn try_create(&self, files_path: &str) -> Result<VersionId> {
        let seed = NewVersion {
            files_path,
            created_at: time::now(),
        };
        let id = self.collection.insert(serde_json::to_value(&seed)?)?;
        Ok(VersionId::from(id))
    }

    /// Fetch a version record, or `None` if missing or on store error.
    pub fn get(&self, id: &VersionId) -> Option<VersionRecord> {
        match self.try_get(id) {
            Ok(found) => found,
            Err(err) => {
                error!("Database error while getting version: {err}");
                None
            }
        }
    }

    fn try_get(&self, id: &VersionId) -> Result<Option<VersionRecord>> {
        let key = DocumentId::parse(id.as_str())?;
        let Some(doc) = self.collection.find(&key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_value(doc)?))
    }
}

impl VersionLookup for VersionDirectory {
    fn version(&self, id: &VersionId) -> Option<VersionRecord> {
        self.get(id)
    }
}
