use serde::{Deserialize, Serialize};

use crate::shared::{
    ValidationError, WarehouseConnectionConfig, WarehouseConnectionConfigWithoutSecrets,
};

/// Query engine the loader runs its merges on.
///
/// This intentionally does not implement [`Serialize`] to avoid leaking secrets.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum EngineConfig {
    /// In-process engine without persistence, useful for dry runs and tests.
    Memory,
    /// PostgreSQL compatible warehouse reached over a single session.
    Postgres { connection: WarehouseConnectionConfig },
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            EngineConfig::Memory => Ok(()),
            EngineConfig::Postgres { connection } => connection.validate(),
        }
    }
}

/// Same as [`EngineConfig`] but without secrets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum EngineConfigWithoutSecrets {
    Memory,
    Postgres {
        connection: WarehouseConnectionConfigWithoutSecrets,
    },
}

impl From<EngineConfig> for EngineConfigWithoutSecrets {
    fn from(value: EngineConfig) -> Self {
        match value {
            EngineConfig::Memory => EngineConfigWithoutSecrets::Memory,
            EngineConfig::Postgres { connection } => EngineConfigWithoutSecrets::Postgres {
                connection: connection.into(),
            },
        }
    }
}
