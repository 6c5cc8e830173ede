//! Live Postgres warehouse for tests.
//!
//! Every [`TestWarehouse`] owns a fresh schema in the database named by the `TESTS_DATABASE_*`
//! environment variables. Sessions opened through [`TestWarehouse::engine`] only have that
//! schema on their `search_path`, like a loader session in production.

use config::shared::{TlsConfig, WarehouseConnectionConfig};
use pg_escape::quote_identifier;
use secrecy::SecretString;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Row};

use crate::engine::postgres::PostgresEngine;

/// Postgres server hostname (required).
pub const DATABASE_HOST_ENV: &str = "TESTS_DATABASE_HOST";
/// Postgres server port (required).
pub const DATABASE_PORT_ENV: &str = "TESTS_DATABASE_PORT";
/// Database user (required). Needs to be allowed to create schemas and the `pgcrypto`
/// extension.
pub const DATABASE_USERNAME_ENV: &str = "TESTS_DATABASE_USERNAME";
/// Database password (optional).
pub const DATABASE_PASSWORD_ENV: &str = "TESTS_DATABASE_PASSWORD";
/// Database to create test schemas in (optional, `postgres` by default).
pub const DATABASE_NAME_ENV: &str = "TESTS_DATABASE_NAME";

const DEFAULT_DATABASE_NAME: &str = "postgres";

/// Returns whether Postgres tests should be skipped.
///
/// Prints a warning and returns `true` when any required env var is missing.
pub fn skip_if_missing_database_env_vars() -> bool {
    let missing: Vec<&str> = [DATABASE_HOST_ENV, DATABASE_PORT_ENV, DATABASE_USERNAME_ENV]
        .iter()
        .copied()
        .filter(|var| std::env::var_os(var).is_none())
        .collect();

    if missing.is_empty() {
        return false;
    }

    eprintln!(
        "skipping postgres integration test: missing {}",
        missing.join(", ")
    );
    true
}

/// Generates a unique schema name for test isolation.
pub fn random_schema_name() -> String {
    format!("dv_tests_{:016x}", rand::random::<u64>())
}

/// A schema of its own in the test database, plus an administrative pool to prepare it.
pub struct TestWarehouse {
    admin: PgPool,
    connection: WarehouseConnectionConfig,
}

impl TestWarehouse {
    /// Connection settings of a loader session on this warehouse.
    pub fn connection_config(&self) -> &WarehouseConnectionConfig {
        &self.connection
    }

    /// Opens a new loader session.
    ///
    /// # Panics
    ///
    /// Panics if the session cannot be opened.
    pub async fn engine(&self) -> PostgresEngine {
        PostgresEngine::connect(&self.connection)
            .await
            .expect("Failed to open a postgres engine session")
    }

    /// Creates `table` in the test schema with the given column names and types.
    pub async fn create_table(&self, table: &str, columns: &[(&str, &str)]) {
        let columns = columns
            .iter()
            .map(|(name, data_type)| format!("{} {data_type}", quote_identifier(name)))
            .collect::<Vec<_>>()
            .join(", ");

        self.execute(&format!("create table {} ({columns})", self.qualified(table)))
            .await;
    }

    /// Inserts text values into `table`, one row per entry of `rows`.
    pub async fn insert_rows(&self, table: &str, columns: &[&str], rows: &[&[Option<&str>]]) {
        let column_list = columns
            .iter()
            .map(|column| quote_identifier(column).into_owned())
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=columns.len())
            .map(|index| format!("${index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let statement = format!(
            "insert into {} ({column_list}) values ({placeholders})",
            self.qualified(table)
        );

        for row in rows {
            let mut query = sqlx::query(&statement);
            for value in row.iter() {
                query = query.bind(*value);
            }
            query
                .execute(&self.admin)
                .await
                .expect("Failed to insert test rows");
        }
    }

    /// Returns the text form of `columns` for every row of `table`, sorted by all columns.
    pub async fn text_rows(&self, table: &str, columns: &[&str]) -> Vec<Vec<Option<String>>> {
        let select_list = columns
            .iter()
            .map(|column| format!("{}::text", quote_identifier(column)))
            .collect::<Vec<_>>()
            .join(", ");
        let order_by = (1..=columns.len())
            .map(|index| index.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let statement = format!(
            "select {select_list} from {} order by {order_by}",
            self.qualified(table)
        );

        let rows = sqlx::query(&statement)
            .fetch_all(&self.admin)
            .await
            .expect("Failed to read test rows");

        rows.iter()
            .map(|row| {
                (0..columns.len())
                    .map(|index| {
                        row.try_get::<Option<String>, _>(index)
                            .expect("Failed to decode test row")
                    })
                    .collect()
            })
            .collect()
    }

    /// Drops the test schema and everything in it.
    pub async fn drop_schema(self) {
        self.execute(&format!(
            "drop schema {} cascade",
            quote_identifier(&self.connection.schema)
        ))
        .await;
        self.admin.close().await;
    }

    async fn execute(&self, statement: &str) {
        sqlx::query(statement)
            .execute(&self.admin)
            .await
            .unwrap_or_else(|err| panic!("Failed to execute `{statement}`: {err}"));
    }

    fn qualified(&self, table: &str) -> String {
        format!(
            "{}.{}",
            quote_identifier(&self.connection.schema),
            quote_identifier(table)
        )
    }
}

/// Creates an isolated warehouse schema for a single test.
///
/// Installs `pgcrypto` in its default schema when missing and points the returned connection
/// settings at wherever the extension lives.
///
/// # Panics
///
/// Panics if a required env var is missing or the database cannot be prepared.
pub async fn setup_test_warehouse() -> TestWarehouse {
    let host = std::env::var(DATABASE_HOST_ENV)
        .unwrap_or_else(|_| panic!("{DATABASE_HOST_ENV} must be set"));
    let port: u16 = std::env::var(DATABASE_PORT_ENV)
        .unwrap_or_else(|_| panic!("{DATABASE_PORT_ENV} must be set"))
        .parse()
        .expect("TESTS_DATABASE_PORT must be a valid port number");
    let username = std::env::var(DATABASE_USERNAME_ENV)
        .unwrap_or_else(|_| panic!("{DATABASE_USERNAME_ENV} must be set"));
    let password = std::env::var(DATABASE_PASSWORD_ENV).unwrap_or_default();
    let database =
        std::env::var(DATABASE_NAME_ENV).unwrap_or_else(|_| DEFAULT_DATABASE_NAME.to_string());

    let options = PgConnectOptions::new_without_pgpass()
        .host(&host)
        .port(port)
        .username(&username)
        .password(&password)
        .database(&database);
    let admin = PgPoolOptions::new()
        .max_connections(2)
        .connect_with(options)
        .await
        .expect("Failed to connect to the test database");

    // Tests run in parallel, a concurrent test may install the extension first.
    if let Err(err) = sqlx::query("create extension if not exists pgcrypto")
        .execute(&admin)
        .await
    {
        eprintln!("create extension pgcrypto failed, checking whether it exists: {err}");
    }
    let pgcrypto_schema: String = sqlx::query_scalar(
        "select n.nspname::text from pg_extension e \
         join pg_namespace n on n.oid = e.extnamespace \
         where e.extname = 'pgcrypto'",
    )
    .fetch_one(&admin)
    .await
    .expect("pgcrypto must be installed in the test database");

    let schema = random_schema_name();
    sqlx::query(&format!("create schema {}", quote_identifier(&schema)))
        .execute(&admin)
        .await
        .expect("Failed to create test schema");

    TestWarehouse {
        admin,
        connection: WarehouseConnectionConfig {
            host,
            port,
            database,
            schema,
            username,
            password: SecretString::new(password),
            role: None,
            pgcrypto_schema,
            tls: TlsConfig::disabled(),
        },
    }
}
