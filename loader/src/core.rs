use config::shared::{EngineConfig, LoaderConfig, LoaderConfigWithoutSecrets};
use tracing::{info, warn};
use vault::engine::Engine;
use vault::engine::memory::MemoryEngine;
use vault::engine::postgres::PostgresEngine;
use vault::error::VaultResult;
use vault::pipeline::{RunSummary, VaultLoader};
use vault::registry::TableRegistry;

use crate::error::LoaderResult;

/// Runs a single load with the provided configuration.
///
/// Builds the table registry, opens one session on the configured engine and runs every
/// stream through it. The session is closed before this returns.
pub async fn run_loader_with_config(loader_config: LoaderConfig) -> LoaderResult<RunSummary> {
    info!("starting vault loader");

    log_config(&loader_config);

    let registry = TableRegistry::from_configs(&loader_config.tables)?;
    let metadata = loader_config.metadata;

    // Static dispatch over the engines, one arm per engine kind.
    let summary = match &loader_config.engine {
        EngineConfig::Memory => {
            let engine = dry_run_engine(&registry).await?;
            run(VaultLoader::new(engine, registry, metadata)).await?
        }
        EngineConfig::Postgres { connection } => {
            let engine = PostgresEngine::connect(connection).await?;
            run(VaultLoader::new(engine, registry, metadata)).await?
        }
    };

    Ok(summary)
}

async fn run<E: Engine>(loader: VaultLoader<E>) -> VaultResult<RunSummary> {
    info!(
        engine = E::name(),
        tables = loader.registry().len(),
        "running vault load"
    );

    loader.run().await
}

/// Memory engine holding an empty stream and table for everything in `registry`.
///
/// Used to check a configuration end to end without a warehouse: every stream is empty, so
/// the run scans all of them and merges nothing.
async fn dry_run_engine(registry: &TableRegistry) -> VaultResult<MemoryEngine> {
    warn!("memory engine selected, running without a warehouse");

    let engine = MemoryEngine::new();
    for stream in registry.streams_in_use() {
        engine.create_stream(&stream.to_string()).await?;
    }
    for table in registry.iter() {
        engine.create_table(&table.target.to_string()).await?;
    }

    Ok(engine)
}

fn log_config(loader_config: &LoaderConfig) {
    let without_secrets = LoaderConfigWithoutSecrets::from(loader_config.clone());

    match serde_json::to_string(&without_secrets) {
        Ok(config) => info!(%config, "loaded configuration"),
        Err(err) => warn!(error = %err, "failed to serialize configuration for logging"),
    }
}
