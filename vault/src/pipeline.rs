use config::shared::LoadMetadataConfig;
use tracing::{error, info};

use crate::bail;
use crate::dispatch::{DispatchOutcome, dispatch};
use crate::engine::Engine;
use crate::error::{ErrorKind, VaultResult};
use crate::registry::TableRegistry;
use crate::scanner::has_pending_changes;

/// Counters describing a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Distinct streams checked for pending changes.
    pub streams_scanned: usize,
    /// Streams without pending changes.
    pub streams_skipped: usize,
    /// Tables a merge was applied to.
    pub tables_merged: usize,
    /// Tables left untouched, either because their stream was empty or their kind has no
    /// loader.
    pub tables_skipped: usize,
    pub rows_affected: u64,
}

/// Single pass over every stream in the registry, bound to one engine session.
///
/// The loader owns the session and closes it when [`VaultLoader::run`] returns, whether the
/// run succeeded or not. Streams are visited in sorted order and processing stops at the
/// first error. Merges already applied by then stay applied.
#[derive(Debug)]
pub struct VaultLoader<E> {
    engine: E,
    registry: TableRegistry,
    metadata: LoadMetadataConfig,
}

impl<E> VaultLoader<E>
where
    E: Engine,
{
    pub fn new(engine: E, registry: TableRegistry, metadata: LoadMetadataConfig) -> Self {
        Self {
            engine,
            registry,
            metadata,
        }
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    /// Loads every configured table and closes the session.
    ///
    /// On failure the error is logged with its backtrace and returned after the session has
    /// been closed. A failure to close is returned only when the run itself succeeded.
    pub async fn run(self) -> VaultResult<RunSummary> {
        info!(
            engine = E::name(),
            tables = self.registry.len(),
            "starting vault load"
        );

        match self.load_streams().await {
            Ok(summary) => {
                self.engine.close().await?;

                info!(
                    streams_scanned = summary.streams_scanned,
                    streams_skipped = summary.streams_skipped,
                    tables_merged = summary.tables_merged,
                    tables_skipped = summary.tables_skipped,
                    rows_affected = summary.rows_affected,
                    "vault load completed"
                );

                Ok(summary)
            }
            Err(err) => {
                error!(
                    error = %err,
                    backtrace = %err.backtrace(),
                    "vault load failed, remaining streams were not processed"
                );

                if let Err(close_err) = self.engine.close().await {
                    error!(error = %close_err, "failed to close engine session after failure");
                }

                Err(err)
            }
        }
    }

    async fn load_streams(&self) -> VaultResult<RunSummary> {
        if self.registry.is_empty() {
            bail!(ErrorKind::ConfigError, "No vault tables are registered");
        }

        let mut summary = RunSummary::default();

        for stream in self.registry.streams_in_use() {
            summary.streams_scanned += 1;

            if !has_pending_changes(&self.engine, &stream).await? {
                summary.streams_skipped += 1;
                summary.tables_skipped += self.registry.tables_for_stream(&stream).count();
                continue;
            }

            for table in self.registry.tables_for_stream(&stream) {
                match dispatch(&self.engine, table, &self.metadata).await? {
                    DispatchOutcome::Merged(outcome) => {
                        summary.tables_merged += 1;
                        summary.rows_affected += outcome.rows_affected;
                    }
                    DispatchOutcome::Skipped => summary.tables_skipped += 1,
                }
            }
        }

        Ok(summary)
    }
}
