use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::version::VersionId;
use crate::core::{DocumentId, Result};
use crate::storage::UpdateSpec;

/// Document field names, shared between the typed records and the update
/// specs the repository builds.
pub(crate) mod fields {
    pub const OWNER_ID: &str = "owner_id";
    pub const NAME: &str = "name";
    pub const VERSION_NUMBER: &str = "version_number";
    pub const BASE_FILE: &str = "base_file";
    pub const PREPROCESSED_FILE: &str = "preprocessed_file";
    pub const COLUMN_RENAME_FILE: &str = "column_rename_file";
    pub const TEMP_DATATYPE_CHANGE_FILE: &str = "temp_datatype_change_file";
    pub const DATATYPE_CHANGE_FILE: &str = "datatype_change_file";
    pub const TEMP_RULES_APPLIED: &str = "temp_rules_applied";
    pub const FINAL_RULES_APPLIED: &str = "final_rules_applied";
    pub const ARE_ALL_STEPS_COMPLETE: &str = "are_all_steps_complete";
    pub const NEW_ADDED_COLUMNS_DATATYPE: &str = "new_added_columns_datatype";
    pub const CUTOFF_DATE: &str = "cutoff_date";
    pub const RULE_APPLICATION_ROOT_VERSIONS: &str = "rule_application_root_versions";
    pub const PRIMARY_ASSET_CLASS: &str = "primary_asset_class";
    pub const SECONDARY_ASSET_CLASS: &str = "secondary_asset_class";
    pub const UPDATED_AT: &str = "updated_at";
}

/// One tracked unit of file-processing work, with versioned file references.
///
/// `version_number` is carried in the schema but never read or incremented
/// by this layer. `cutoff_date` is expected in dd/mm/yyyy form and stored
/// verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: DocumentId,
    pub owner_id: DocumentId,
    pub name: String,
    pub base_file_path: String,
    pub version_number: i64,
    pub base_file: Option<VersionId>,
    pub preprocessed_file: Option<VersionId>,
    pub column_rename_file: Option<VersionId>,
    pub temp_datatype_change_file: Option<VersionId>,
    pub datatype_change_file: Option<VersionId>,
    pub temp_rules_applied: Option<VersionId>,
    pub final_rules_applied: Option<VersionId>,
    pub are_all_steps_complete: bool,
    pub new_added_columns_datatype: BTreeMap<String, String>,
    pub cutoff_date: Option<String>,
    #[serde(default)]
    pub rule_application_root_versions: Vec<VersionId>,
    pub primary_asset_class: Option<String>,
    pub secondary_asset_class: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Field set written at creation time; the store generates and embeds `id`.
#[derive(Debug, Serialize)]
pub(crate) struct NewTransaction<'a> {
    pub owner_id: DocumentId,
    pub name: &'a str,
    pub base_file_path: &'a str,
    pub version_number: i64,
    pub base_file: Option<VersionId>,
    pub preprocessed_file: Option<VersionId>,
    pub column_rename_file: Option<VersionId>,
    pub temp_datatype_change_file: Option<VersionId>,
    pub datatype_change_file: Option<VersionId>,
    pub temp_rules_applied: Option<VersionId>,
    pub final_rules_applied: Option<VersionId>,
    pub are_all_steps_complete: bool,
    pub new_added_columns_datatype: BTreeMap<String, String>,
    pub cutoff_date: Option<String>,
    pub rule_application_root_versions: Vec<VersionId>,
    pub primary_asset_class: Option<&'a str>,
    pub secondary_asset_class: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> NewTransaction<'a> {
    pub fn new(
        owner_id: DocumentId,
        name: &'a str,
        base_file_path: &'a str,
        primary_asset_class: Option<&'a str>,
        secondary_asset_class: Option<&'a str>,
        stamp: DateTime<Utc>,
    ) -> Self {
        Self {
            owner_id,
            name,
            base_file_path,
            version_number: 0,
            base_file: None,
            preprocessed_file: None,
            column_rename_file: None,
            temp_datatype_change_file: None,
            datatype_change_file: None,
            temp_rules_applied: None,
            final_rules_applied: None,
            are_all_steps_complete: false,
            new_added_columns_datatype: BTreeMap::new(),
            cutoff_date: None,
            rule_application_root_versions: Vec::new(),
            primary_asset_class,
            secondary_asset_class,
            created_at: stamp,
            updated_at: stamp,
        }
    }
}

/// Row returned by owner listings: the transaction plus the resolved
/// storage location of its base file (empty when `base_file` is unset or
/// the version lookup misses).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionListing {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub base_file_location: String,
}

/// Typed partial update for [`Transaction`].
///
/// The identifier and owner fields are not representable here, so the
/// generic update path cannot modify them. Nullable record fields are
/// doubly wrapped: `None` leaves the field alone, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub name: Option<String>,
    pub version_number: Option<i64>,
    pub base_file: Option<Option<VersionId>>,
    pub preprocessed_file: Option<Option<VersionId>>,
    pub column_rename_file: Option<Option<VersionId>>,
    pub temp_datatype_change_file: Option<Option<VersionId>>,
    pub datatype_change_file: Option<Option<VersionId>>,
    pub temp_rules_applied: Option<Option<VersionId>>,
    pub final_rules_applied: Option<Option<VersionId>>,
    pub are_all_steps_complete: Option<bool>,
    pub new_added_columns_datatype: Option<BTreeMap<String, String>>,
    pub cutoff_date: Option<Option<String>>,
    pub rule_application_root_versions: Option<Vec<VersionId>>,
    pub primary_asset_class: Option<Option<String>>,
    pub secondary_asset_class: Option<Option<String>>,
}

impl TransactionPatch {
    pub(crate) fn to_update_spec(&self) -> Result<UpdateSpec> {
        let mut spec = UpdateSpec::new();

        if let Some(name) = &self.name {
            spec = spec.set(fields::NAME, Value::String(name.clone()));
        }
        if let Some(version_number) = self.version_number {
            spec = spec.set(fields::VERSION_NUMBER, Value::from(version_number));
        }
        if let Some(base_file) = &self.base_file {
            spec = spec.set(fields::BASE_FILE, serde_json::to_value(base_file)?);
        }
        if let Some(preprocessed_file) = &self.preprocessed_file {
            spec = spec.set(
                fields::PREPROCESSED_FILE,
                serde_json::to_value(preprocessed_file)?,
            );
        }
        if let Some(column_rename_file) = &self.column_rename_file {
            spec = spec.set(
                fields::COLUMN_RENAME_FILE,
                serde_json::to_value(column_rename_file)?,
            );
        }
        if let Some(temp_datatype_change_file) = &self.temp_datatype_change_file {
            spec = spec.set(
                fields::TEMP_DATATYPE_CHANGE_FILE,
                serde_json::to_value(temp_datatype_change_file)?,
            );
        }
        if let Some(datatype_change_file) = &self.datatype_change_file {
            spec = spec.set(
                fields::DATATYPE_CHANGE_FILE,
                serde_json::to_value(datatype_change_file)?,
            );
        }
        if let Some(temp_rules_applied) = &self.temp_rules_applied {
            spec = spec.set(
                fields::TEMP_RULES_APPLIED,
                serde_json::to_value(temp_rules_applied)?,
            );
        }
        if let Some(final_rules_applied) = &self.final_rules_applied {
            spec = spec.set(
                fields::FINAL_RULES_APPLIED,
                serde_json::to_value(final_rules_applied)?,
            );
        }
        if let Some(are_all_steps_complete) = self.are_all_steps_complete {
            spec = spec.set(
                fields::ARE_ALL_STEPS_COMPLETE,
                Value::Bool(are_all_steps_complete),
            );
        }
        if let Some(new_added_columns_datatype) = &self.new_added_columns_datatype {
            spec = spec.set(
                fields::NEW_ADDED_COLUMNS_DATATYPE,
                serde_json::to_value(new_added_columns_datatype)?,
            );
        }
        if let Some(cutoff_date) = &self.cutoff_date {
            spec = spec.set(fields::CUTOFF_DATE, serde_json::to_value(cutoff_date)?);
        }
        if let Some(rule_application_root_versions) = &self.rule_application_root_versions {
            spec = spec.set(
                fields::RULE_APPLICATION_ROOT_VERSIONS,
                serde_json::to_value(rule_application_root_versions)?,
            );
        }
        if let Some(primary_asset_class) = &self.primary_asset_class {
            spec = spec.set(
                fields::PRIMARY_ASSET_CLASS,
                serde_json::to_value(primary_asset_class)?,
            );
        }
        if let Some(secondary_asset_class) = &self.secondary_asset_class {
            spec = spec.set(
                fields::SECONDARY_ASSET_CLASS,
                serde_json::to_value(secondary_asset_class)?,
            );
        }

        Ok(spec)
    }
}
