//! Shared configuration types for the loader.

mod base;
mod connection;
mod engine;
mod loader;
mod log;
mod metadata;
mod table;

pub use base::ValidationError;
pub use connection::{
    IntoConnectOptions, TlsConfig, WarehouseConnectionConfig,
    WarehouseConnectionConfigWithoutSecrets,
};
pub use engine::{EngineConfig, EngineConfigWithoutSecrets};
pub use loader::{LoaderConfig, LoaderConfigWithoutSecrets};
pub use log::{LogConfig, LogLevel};
pub use metadata::{HashAlgorithm, LoadMetadataConfig};
pub use table::{BusinessKeyColumns, TableConfig, TableKind};
