use std::sync::Arc;

use log::error;
use serde_json::Value;

use super::transaction::{
    NewTransaction, Transaction, TransactionListing, TransactionPatch, fields,
};
use super::version::{VersionId, VersionLookup};
use crate::core::{DocumentId, Result, time};
use crate::storage::{Collection, DocumentStore, UpdateSpec};

/// Collection holding the transaction documents.
pub const TRANSACTION_COLLECTION: &str = "transactions";

/// Data-access layer for transaction workflow records.
///
/// Every operation is a single store call. Store and identifier errors are
/// caught at the method boundary, logged, and collapsed into the
/// operation's negative result; callers cannot distinguish "not found"
/// from a store failure.
pub struct TransactionRepository {
    collection: Arc<Collection>,
    versions: Arc<dyn VersionLookup>,
}

impl TransactionRepository {
    pub fn new(store: &DocumentStore, versions: Arc<dyn VersionLookup>) -> Result<Self> {
        Ok(Self {
            collection: store.collection(TRANSACTION_COLLECTION)?,
            versions,
        })
    }

    /// Fetch a transaction by id.
    pub fn get(&self, transaction_id: &str) -> Option<Transaction> {
        match self.try_get(transaction_id) {
            Ok(found) => found,
            Err(err) => {
                error!("Database error while getting transaction: {err}");
                None
            }
        }
    }

    fn try_get(&self, transaction_id: &str) -> Result<Option<Transaction>> {
        let id = DocumentId::parse(transaction_id)?;
        let Some(doc) = self.collection.find(&id)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_value(doc)?))
    }

    /// Create a transaction with the full default field set; returns its id.
    pub fn create(
        &self,
        owner_id: &str,
        name: &str,
        base_file_path: &str,
        primary_asset_class: Option<&str>,
        secondary_asset_class: Option<&str>,
    ) -> Option<DocumentId> {
        let result = self.try_create(
            owner_id,
            name,
            base_file_path,
            primary_asset_class,
            secondary_asset_class,
        );
        match result {
            Ok(id) => Some(id),
            Err(err) => {
                error!("Database error while creating transaction: {err}");
                None
            }
        }
    }

    fn try_create(
        &self,
        owner_id: &str,
        name: &str,
        base_file_path: &str,
        primary_asset_class: Option<&str>,
        secondary_asset_class: Option<&str>,
    ) -> Result<DocumentId> {
        let owner = DocumentId::parse(owner_id)?;
        let seed = NewTransaction::new(
            owner,
            name,
            base_file_path,
            primary_asset_class,
            secondary_asset_class,
            time::now(),
        );
        self.collection.insert(serde_json::to_value(&seed)?)
    }

    /// Record the datatype of a newly added column.
    pub fn add_new_column_datatype(
        &self,
        transaction_id: &str,
        column_name: &str,
        datatype: &str,
    ) -> bool {
        let spec = UpdateSpec::new().set_key(
            fields::NEW_ADDED_COLUMNS_DATATYPE,
            column_name,
            Value::String(datatype.to_string()),
        );
        self.update_with("adding new column datatype", transaction_id, spec)
    }

    /// Apply a partial update. Returns `true` only if a document was
    /// actually modified.
    pub fn update(&self, transaction_id: &str, patch: &TransactionPatch) -> bool {
        match patch.to_update_spec() {
            Ok(spec) => self.update_with("updating transaction", transaction_id, spec),
            Err(err) => {
                error!("Database error while updating transaction: {err}");
                false
            }
        }
    }

    /// Delete a transaction. Related version records are not touched.
    pub fn delete(&self, transaction_id: &str) -> bool {
        match self.try_delete(transaction_id) {
            Ok(removed) => removed,
            Err(err) => {
                error!("Database error while deleting transaction: {err}");
                false
            }
        }
    }

    fn try_delete(&self, transaction_id: &str) -> Result<bool> {
        let id = DocumentId::parse(transaction_id)?;
        self.collection.remove(&id)
    }

    /// All transactions owned by `owner_id`, each with its base file
    /// location resolved through the version lookup.
    pub fn list_by_owner(&self, owner_id: &str) -> Vec<TransactionListing> {
        match self.try_list_by_owner(owner_id) {
            Ok(rows) => rows,
            Err(err) => {
                error!("Database error while fetching transactions for user {owner_id}: {err}");
                Vec::new()
            }
        }
    }

    fn try_list_by_owner(&self, owner_id: &str) -> Result<Vec<TransactionListing>> {
        let owner = DocumentId::parse(owner_id)?;
        let docs = self
            .collection
            .scan_eq(fields::OWNER_ID, &Value::String(owner.to_string()))?;

        let mut rows = Vec::with_capacity(docs.len());
        for doc in docs {
            let transaction: Transaction = serde_json::from_value(doc)?;
            let base_file_location = transaction
                .base_file
                .as_ref()
                .and_then(|version| self.versions.version(version))
                .map(|record| record.files_path)
                .unwrap_or_default();
            rows.push(TransactionListing {
                transaction,
                base_file_location,
            });
        }
        Ok(rows)
    }

    /// Point the transaction's base file at a version.
    pub fn set_base_file(&self, transaction_id: &str, version_id: &VersionId) -> bool {
        let spec = UpdateSpec::new().set(
            fields::BASE_FILE,
            Value::String(version_id.as_str().to_string()),
        );
        self.update_with("setting base_file", transaction_id, spec)
    }

    /// Point the transaction's preprocessed file at a version.
    pub fn set_preprocessed_file(&self, transaction_id: &str, version_id: &VersionId) -> bool {
        let spec = UpdateSpec::new().set(
            fields::PREPROCESSED_FILE,
            Value::String(version_id.as_str().to_string()),
        );
        self.update_with("setting preprocessed_file", transaction_id, spec)
    }

    /// Change the transaction's name.
    pub fn rename(&self, transaction_id: &str, new_name: &str) -> bool {
        let spec = UpdateSpec::new().set(fields::NAME, Value::String(new_name.to_string()));
        self.update_with("changing transaction name", transaction_id, spec)
    }

    /// Set the cutoff date. Expected in dd/mm/yyyy form; stored verbatim.
    pub fn set_cutoff_date(&self, transaction_id: &str, cutoff_date: &str) -> bool {
        let spec = UpdateSpec::new().set(
            fields::CUTOFF_DATE,
            Value::String(cutoff_date.to_string()),
        );
        self.update_with("updating cutoff date", transaction_id, spec)
    }

    /// Append a root version for rule application. Duplicates are allowed.
    pub fn add_rule_application_root_version(
        &self,
        transaction_id: &str,
        version_id: &VersionId,
    ) -> bool {
        let spec = UpdateSpec::new().push(
            fields::RULE_APPLICATION_ROOT_VERSIONS,
            Value::String(version_id.as_str().to_string()),
        );
        self.update_with("adding root version", transaction_id, spec)
    }

    /// Remove every occurrence of a root version from the list.
    ///
    /// Versions derived from the removed root are left in place; cleaning
    /// them up is the caller's concern.
    pub fn remove_rule_application_root_version(
        &self,
        transaction_id: &str,
        version_id: &VersionId,
    ) -> bool {
        let spec = UpdateSpec::new().pull(
            fields::RULE_APPLICATION_ROOT_VERSIONS,
            Value::String(version_id.as_str().to_string()),
        );
        self.update_with("removing root version", transaction_id, spec)
    }

    /// Run one update spec against one document, stamping `updated_at` on
    /// the modified path. Returns `true` only if the document changed.
    fn update_with(&self, context: &str, transaction_id: &str, spec: UpdateSpec) -> bool {
        match self.try_update_with(transaction_id, spec) {
            Ok(modified) => modified,
            Err(err) => {
                error!("Database error while {context}: {err}");
                false
            }
        }
    }

    fn try_update_with(&self, transaction_id: &str, spec: UpdateSpec) -> Result<bool> {
        let id = DocumentId::parse(transaction_id)?;
        let stamp = serde_json::to_value(time::now())?;
        let outcome = self
            .collection
            .update(&id, &spec.touch(fields::UPDATED_AT, stamp))?;
        Ok(outcome.modified)
    }
}
