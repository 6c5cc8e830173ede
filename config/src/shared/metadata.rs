use serde::{Deserialize, Serialize};

use crate::shared::ValidationError;

const fn default_hash_algorithm() -> HashAlgorithm {
    HashAlgorithm::Sha1
}

fn default_load_timestamp_column() -> String {
    LoadMetadataConfig::DEFAULT_LOAD_TIMESTAMP_COLUMN.to_string()
}

fn default_record_source_column() -> String {
    LoadMetadataConfig::DEFAULT_RECORD_SOURCE_COLUMN.to_string()
}

fn default_record_source() -> String {
    LoadMetadataConfig::DEFAULT_RECORD_SOURCE.to_string()
}

fn default_change_kind_column() -> String {
    LoadMetadataConfig::DEFAULT_CHANGE_KIND_COLUMN.to_string()
}

/// Digest used to derive hash keys from business keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

/// Names and values of the audit columns written alongside every vault row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoadMetadataConfig {
    #[serde(default = "default_load_timestamp_column")]
    pub load_timestamp_column: String,
    #[serde(default = "default_record_source_column")]
    pub record_source_column: String,
    /// Value stored in the record source column.
    #[serde(default = "default_record_source")]
    pub record_source: String,
    /// Column of the change stream that marks inserts, updates and deletes.
    #[serde(default = "default_change_kind_column")]
    pub change_kind_column: String,
    #[serde(default = "default_hash_algorithm")]
    pub hash_algorithm: HashAlgorithm,
}

impl LoadMetadataConfig {
    pub const DEFAULT_LOAD_TIMESTAMP_COLUMN: &'static str = "LDTS";
    pub const DEFAULT_RECORD_SOURCE_COLUMN: &'static str = "RSCR";
    pub const DEFAULT_RECORD_SOURCE: &'static str = "SYSTEM";
    pub const DEFAULT_CHANGE_KIND_COLUMN: &'static str = "METADATA$ACTION";

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.load_timestamp_column.trim().is_empty() {
            return Err(ValidationError::EmptyMetadataColumn("load_timestamp_column"));
        }
        if self.record_source_column.trim().is_empty() {
            return Err(ValidationError::EmptyMetadataColumn("record_source_column"));
        }
        if self.change_kind_column.trim().is_empty() {
            return Err(ValidationError::EmptyMetadataColumn("change_kind_column"));
        }

        Ok(())
    }
}

impl Default for LoadMetadataConfig {
    fn default() -> Self {
        Self {
            load_timestamp_column: default_load_timestamp_column(),
            record_source_column: default_record_source_column(),
            record_source: default_record_source(),
            change_kind_column: default_change_kind_column(),
            hash_algorithm: default_hash_algorithm(),
        }
    }
}
