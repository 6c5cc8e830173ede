use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::Config;
use crate::shared::{
    EngineConfig, EngineConfigWithoutSecrets, LoadMetadataConfig, LogConfig, TableConfig,
    ValidationError,
};

/// Complete configuration of a loader run.
///
/// This intentionally does not implement [`Serialize`] to avoid accidentally leaking the
/// warehouse password; use [`LoaderConfigWithoutSecrets`] for logging.
#[derive(Debug, Clone, Deserialize)]
pub struct LoaderConfig {
    pub engine: EngineConfig,
    /// Vault tables loaded by this run, in configuration order.
    pub tables: Vec<TableConfig>,
    #[serde(default)]
    pub metadata: LoadMetadataConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl LoaderConfig {
    /// Validates the configuration before any session is opened.
    ///
    /// Rejects tables whose kind can be neither read nor derived from the name, so a
    /// renamed or misconfigured table fails the run up front instead of being ignored.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.engine.validate()?;
        self.metadata.validate()?;

        if self.tables.is_empty() {
            return Err(ValidationError::NoTables);
        }

        let mut targets = HashSet::with_capacity(self.tables.len());
        for (index, table) in self.tables.iter().enumerate() {
            if table.target_table.trim().is_empty() {
                return Err(ValidationError::EmptyName {
                    index,
                    field: "target_table",
                });
            }
            if table.source_stream.trim().is_empty() {
                return Err(ValidationError::EmptyName {
                    index,
                    field: "source_stream",
                });
            }
            if !targets.insert(table.target_table.as_str()) {
                return Err(ValidationError::DuplicateTargetTable(
                    table.target_table.clone(),
                ));
            }

            let Some(kind) = table.resolved_kind() else {
                return Err(ValidationError::UnknownTableKind(
                    table.target_table.clone(),
                ));
            };

            let has_business_key = table
                .business_key
                .as_ref()
                .is_some_and(|business_key| business_key.is_valid());
            if kind.requires_business_key() && !has_business_key {
                return Err(ValidationError::MissingBusinessKey(
                    table.target_table.clone(),
                ));
            }

            let has_hash_key = table
                .hash_key
                .as_ref()
                .is_some_and(|hash_key| !hash_key.trim().is_empty());
            if kind.requires_hash_key() && !has_hash_key {
                return Err(ValidationError::MissingHashKey(table.target_table.clone()));
            }

            if table.references_column(&self.metadata.change_kind_column) {
                return Err(ValidationError::ChangeKindColumnReferenced {
                    table: table.target_table.clone(),
                    column: self.metadata.change_kind_column.clone(),
                });
            }
        }

        Ok(())
    }
}

impl Config for LoaderConfig {
    const LIST_PARSE_KEYS: &'static [&'static str] = &[];
}

/// Same as [`LoaderConfig`] but without secrets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfigWithoutSecrets {
    pub engine: EngineConfigWithoutSecrets,
    pub tables: Vec<TableConfig>,
    pub metadata: LoadMetadataConfig,
    pub log: LogConfig,
}

impl From<LoaderConfig> for LoaderConfigWithoutSecrets {
    fn from(value: LoaderConfig) -> Self {
        LoaderConfigWithoutSecrets {
            engine: value.engine.into(),
            tables: value.tables,
            metadata: value.metadata,
            log: value.log,
        }
    }
}
