//! Data Vault loader core.
//!
//! A run reads the change streams referenced by a [`registry::TableRegistry`], skips streams
//! without pending changes and loads every table bound to the remaining ones with the handler
//! of the table's kind:
//!
//! - hubs receive newly seen business keys together with their hash key and are never updated,
//! - reference tables are upserted by business key,
//! - links and satellites are logged and left untouched.
//!
//! The heavy lifting happens in an [`engine::Engine`]. Handlers describe their work as a
//! [`merge::MergePlan`] and the engine applies it as one set-based statement. The
//! [`pipeline::VaultLoader`] drives a run over a single engine session and always closes it.
//!
//! ```rust,no_run
//! use config::shared::LoadMetadataConfig;
//! use vault::engine::memory::MemoryEngine;
//! use vault::pipeline::VaultLoader;
//! use vault::registry::TableRegistry;
//!
//! # async fn example(tables: Vec<config::shared::TableConfig>) -> vault::error::VaultResult<()> {
//! let registry = TableRegistry::from_configs(&tables)?;
//! let loader = VaultLoader::new(MemoryEngine::new(), registry, LoadMetadataConfig::default());
//! let summary = loader.run().await?;
//! println!("{} rows affected", summary.rows_affected);
//! # Ok(())
//! # }
//! ```

pub mod dispatch;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod hash;
mod macros;
pub mod merge;
pub mod pipeline;
pub mod registry;
pub mod scanner;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;
