use config::shared::{IntoConnectOptions, WarehouseConnectionConfig};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::{debug, info};

use crate::engine::Engine;
use crate::engine::postgres::sql::{render_merge, render_pending_changes_query};
use crate::error::{ErrorKind, VaultError, VaultResult};
use crate::merge::{MergeOutcome, MergePlan};
use crate::types::ObjectName;
use crate::vault_error;

/// A single warehouse session backed by Postgres.
///
/// The pool is capped at one connection so every statement of a run goes through the same
/// session and sees the same session parameters.
#[derive(Debug, Clone)]
pub struct PostgresEngine {
    pool: PgPool,
    pgcrypto_schema: String,
}

impl PostgresEngine {
    /// Opens the session described by `config`.
    pub async fn connect(config: &WarehouseConnectionConfig) -> VaultResult<PostgresEngine> {
        let options: PgConnectOptions = config.connect_options();

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .connect_with(options)
            .await?;

        info!(
            host = %config.host,
            database = %config.database,
            schema = %config.schema,
            "connected to warehouse"
        );

        Ok(PostgresEngine {
            pool,
            pgcrypto_schema: config.pgcrypto_schema.clone(),
        })
    }
}

impl Engine for PostgresEngine {
    fn name() -> &'static str {
        "postgres"
    }

    async fn has_pending_changes(&self, stream: &ObjectName) -> VaultResult<bool> {
        let query = render_pending_changes_query(stream);
        debug!(%stream, %query, "checking stream for pending changes");

        let pending: bool = sqlx::query_scalar(&query)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| stream_error(stream, err))?;

        Ok(pending)
    }

    async fn merge(&self, plan: &MergePlan) -> VaultResult<MergeOutcome> {
        let statement = render_merge(plan, &self.pgcrypto_schema);
        debug!(target_table = %plan.target, %statement, "executing merge");

        let result = sqlx::query(&statement).execute(&self.pool).await?;

        Ok(MergeOutcome {
            rows_affected: result.rows_affected(),
        })
    }

    async fn close(&self) -> VaultResult<()> {
        info!("closing warehouse session");
        self.pool.close().await;

        Ok(())
    }
}

/// A missing relation in an emptiness check is the stream, not a target table.
fn stream_error(stream: &ObjectName, err: sqlx::Error) -> VaultError {
    let err = VaultError::from(err);
    if err.kind() == ErrorKind::TargetTableMissing {
        return vault_error!(
            ErrorKind::StreamMissing,
            "Change stream not found",
            stream,
            source: err
        );
    }

    err
}
