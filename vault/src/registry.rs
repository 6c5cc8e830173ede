//! Registry of the vault tables a run loads.
//!
//! The registry is built once at startup from configuration and injected into the
//! [`crate::pipeline::VaultLoader`]. It is immutable afterwards.

use std::collections::BTreeSet;

use config::shared::{TableConfig, TableKind};

use crate::bail;
use crate::error::{ErrorKind, VaultResult};
use crate::types::ObjectName;

/// Kind specific parameters of a vault table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    Hub {
        business_key: Vec<String>,
        hash_key: String,
    },
    Link {
        hash_key: String,
        parent_hubs: Vec<String>,
    },
    Satellite {
        hash_key: String,
        attributes: Vec<String>,
    },
    Reference {
        business_key: Vec<String>,
    },
}

impl Entity {
    pub fn kind(&self) -> TableKind {
        match self {
            Entity::Hub { .. } => TableKind::Hub,
            Entity::Link { .. } => TableKind::Link,
            Entity::Satellite { .. } => TableKind::Satellite,
            Entity::Reference { .. } => TableKind::Reference,
        }
    }
}

/// A validated vault table: where it is read from, where it is written to and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    pub target: ObjectName,
    pub source_stream: ObjectName,
    pub entity: Entity,
}

impl TableDefinition {
    /// Validates a configured table and resolves its kind.
    pub fn from_config(config: &TableConfig) -> VaultResult<TableDefinition> {
        let target = ObjectName::parse(&config.target_table)?;
        let source_stream = ObjectName::parse(&config.source_stream)?;

        let Some(kind) = config.resolved_kind() else {
            bail!(
                ErrorKind::ConfigError,
                "Table kind is neither configured nor implied by the table name",
                format!(
                    "table `{}` must declare `kind` or start with `HUB`, `LNK`, `SAT` or `REF`",
                    config.target_table
                )
            );
        };

        let business_key = config
            .business_key
            .as_ref()
            .filter(|business_key| business_key.is_valid())
            .map(|business_key| business_key.columns());
        let hash_key = config
            .hash_key
            .as_ref()
            .filter(|hash_key| !hash_key.trim().is_empty())
            .cloned();

        let entity = match kind {
            TableKind::Hub => Entity::Hub {
                business_key: require_business_key(config, business_key)?,
                hash_key: require_hash_key(config, hash_key)?,
            },
            TableKind::Link => Entity::Link {
                hash_key: require_hash_key(config, hash_key)?,
                parent_hubs: config.parent_hubs.clone(),
            },
            TableKind::Satellite => Entity::Satellite {
                hash_key: require_hash_key(config, hash_key)?,
                attributes: config.attributes.clone(),
            },
            TableKind::Reference => Entity::Reference {
                business_key: require_business_key(config, business_key)?,
            },
        };

        Ok(TableDefinition {
            target,
            source_stream,
            entity,
        })
    }

    pub fn kind(&self) -> TableKind {
        self.entity.kind()
    }
}

fn require_business_key(
    config: &TableConfig,
    business_key: Option<Vec<String>>,
) -> VaultResult<Vec<String>> {
    match business_key {
        Some(business_key) => Ok(business_key),
        None => bail!(
            ErrorKind::ConfigError,
            "Table requires a business key",
            format!("table `{}` has no usable `business_key`", config.target_table)
        ),
    }
}

fn require_hash_key(config: &TableConfig, hash_key: Option<String>) -> VaultResult<String> {
    match hash_key {
        Some(hash_key) => Ok(hash_key),
        None => bail!(
            ErrorKind::ConfigError,
            "Table requires a hash key column",
            format!("table `{}` has no `hash_key`", config.target_table)
        ),
    }
}

/// Immutable lookup of the configured vault tables.
#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    tables: Vec<TableDefinition>,
}

impl TableRegistry {
    /// Builds the registry, failing on the first invalid or duplicated table.
    pub fn from_configs(configs: &[TableConfig]) -> VaultResult<TableRegistry> {
        let mut tables: Vec<TableDefinition> = Vec::with_capacity(configs.len());

        for config in configs {
            let definition = TableDefinition::from_config(config)?;

            if tables.iter().any(|table| table.target == definition.target) {
                bail!(
                    ErrorKind::ConfigError,
                    "Target table is configured more than once",
                    definition.target
                );
            }

            tables.push(definition);
        }

        Ok(TableRegistry { tables })
    }

    /// Definition of the table named `target_table`, as written in the configuration.
    pub fn kind_and_params_for(&self, target_table: &str) -> Option<&TableDefinition> {
        self.tables
            .iter()
            .find(|table| table.target.to_string() == target_table)
    }

    /// Every distinct source stream referenced by the registry, in sorted order.
    pub fn streams_in_use(&self) -> BTreeSet<ObjectName> {
        self.tables
            .iter()
            .map(|table| table.source_stream.clone())
            .collect()
    }

    /// Tables fed by `stream`, in configuration order.
    pub fn tables_for_stream<'a>(
        &'a self,
        stream: &'a ObjectName,
    ) -> impl Iterator<Item = &'a TableDefinition> + 'a {
        self.tables
            .iter()
            .filter(move |table| &table.source_stream == stream)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableDefinition> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
