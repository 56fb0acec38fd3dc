// ============================================================================
// txnstore Library
// ============================================================================

pub mod core;
pub mod model;
pub mod storage;

// Re-export main types for convenience
pub use self::core::{DocumentId, Result, StoreError};
pub use model::{
    Transaction, TransactionListing, TransactionPatch, TransactionRepository, VersionDirectory,
    VersionId, VersionLookup, VersionRecord,
};
pub use storage::{Collection, DocumentStore, UpdateOutcome, UpdateSpec};

use std::sync::Arc;

// ============================================================================
// High-level database handle
// ============================================================================

/// In-memory database bundling the document store with the data-access
/// layers on top of it.
///
/// This is the recommended entry point for applications: one handle owns
/// the store, the version directory, and the transaction repository, all
/// sharing the same collections.
///
/// # Examples
///
/// ```
/// use txnstore::Database;
///
/// # fn main() -> txnstore::Result<()> {
/// let db = Database::in_memory()?;
/// let owner = txnstore::DocumentId::generate().to_string();
///
/// let id = db
///     .transactions()
///     .create(&owner, "Q3 loan tape", "/data/q3", Some("equity"), None)
///     .expect("create failed");
///
/// let transaction = db.transactions().get(&id.to_string()).expect("missing");
/// assert_eq!(transaction.name, "Q3 loan tape");
/// # Ok(())
/// # }
/// ```
pub struct Database {
    store: Arc<DocumentStore>,
    versions: Arc<VersionDirectory>,
    transactions: TransactionRepository,
}

impl Database {
    /// Open a fresh in-memory database.
    pub fn in_memory() -> Result<Self> {
        let store = Arc::new(DocumentStore::new());
        let versions = Arc::new(VersionDirectory::new(&store)?);
        let lookup: Arc<dyn VersionLookup> = versions.clone();
        let transactions = TransactionRepository::new(&store, lookup)?;
        Ok(Self {
            store,
            versions,
            transactions,
        })
    }

    /// The transaction repository.
    pub fn transactions(&self) -> &TransactionRepository {
        &self.transactions
    }

    /// The version directory.
    pub fn versions(&self) -> &VersionDirectory {
        &self.versions
    }

    /// The underlying document store, for direct collection access.
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_wires_both_collections() {
        let db = Database::in_memory().unwrap();
        let names = db.store().collection_names().unwrap();
        assert_eq!(
            names,
            vec![
                model::VERSION_COLLECTION.to_string(),
                model::TRANSACTION_COLLECTION.to_string(),
            ]
        );
    }

    #[test]
    fn test_create_and_fetch_through_handle() {
        let db = Database::in_memory().unwrap();
        let owner = DocumentId::generate().to_string();

        let id = db
            .transactions()
            .create(&owner, "smoke", "/tmp/smoke", None, None)
            .unwrap();

        let transaction = db.transactions().get(&id.to_string()).unwrap();
        assert_eq!(transaction.owner_id.to_string(), owner);
    }

    #[test]
    fn test_version_directory_roundtrip() {
        let db = Database::in_memory().unwrap();

        let version = db.versions().create("/data/v1.csv").unwrap();
        let record = db.versions().get(&version).unwrap();
        assert_eq!(record.files_path, "/data/v1.csv");
    }
}
