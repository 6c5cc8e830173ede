use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::shared::ValidationError;

/// Application name reported to the warehouse for every loader session.
const APPLICATION_NAME: &str = "dv_loader";

fn default_pgcrypto_schema() -> String {
    WarehouseConnectionConfig::DEFAULT_PGCRYPTO_SCHEMA.to_string()
}

/// Connection target and credentials for the warehouse session.
///
/// There is deliberately no default for the password: it has to come from a configuration
/// file or, preferably, from `APP_ENGINE__CONNECTION__PASSWORD`.
///
/// This intentionally does not implement [`Serialize`] to avoid leaking the password.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WarehouseConnectionConfig {
    pub host: String,
    pub port: u16,
    /// Database holding the streams and the vault tables.
    pub database: String,
    /// Schema used to resolve unqualified stream and table names.
    pub schema: String,
    pub username: String,
    pub password: SecretString,
    /// Role assumed by the session, if any.
    #[serde(default)]
    pub role: Option<String>,
    /// Schema the `pgcrypto` extension is installed in.
    ///
    /// `digest` is called qualified with this schema, so it does not have to be on the
    /// session `search_path`.
    #[serde(default = "default_pgcrypto_schema")]
    pub pgcrypto_schema: String,
    #[serde(default = "TlsConfig::disabled")]
    pub tls: TlsConfig,
}

impl WarehouseConnectionConfig {
    pub const DEFAULT_PGCRYPTO_SCHEMA: &'static str = "public";

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.password.expose_secret().is_empty() {
            return Err(ValidationError::EmptyPassword);
        }
        if self.pgcrypto_schema.trim().is_empty() {
            return Err(ValidationError::EmptyPgcryptoSchema);
        }

        self.tls.validate()
    }

    /// Runtime parameters applied when the session starts.
    pub fn session_parameters(&self) -> Vec<(String, String)> {
        let mut parameters = vec![
            ("application_name".to_string(), APPLICATION_NAME.to_string()),
            ("search_path".to_string(), self.schema.clone()),
            ("timezone".to_string(), "UTC".to_string()),
        ];

        if let Some(role) = &self.role {
            parameters.push(("role".to_string(), role.clone()));
        }

        parameters
    }
}

/// Same as [`WarehouseConnectionConfig`] but without the password, safe to serialize and log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WarehouseConnectionConfigWithoutSecrets {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub schema: String,
    pub username: String,
    pub role: Option<String>,
    pub pgcrypto_schema: String,
    pub tls_enabled: bool,
}

impl From<WarehouseConnectionConfig> for WarehouseConnectionConfigWithoutSecrets {
    fn from(value: WarehouseConnectionConfig) -> Self {
        WarehouseConnectionConfigWithoutSecrets {
            host: value.host,
            port: value.port,
            database: value.database,
            schema: value.schema,
            username: value.username,
            role: value.role,
            pgcrypto_schema: value.pgcrypto_schema,
            tls_enabled: value.tls.enabled,
        }
    }
}

/// TLS settings for the warehouse session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TlsConfig {
    /// PEM-encoded trusted root certificates.
    #[serde(default)]
    pub trusted_root_certs: String,
    pub enabled: bool,
}

impl TlsConfig {
    pub fn disabled() -> Self {
        Self {
            trusted_root_certs: String::new(),
            enabled: false,
        }
    }

    /// Fails when TLS is enabled without any trusted root certificates.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.enabled && self.trusted_root_certs.trim().is_empty() {
            return Err(ValidationError::MissingTrustedRootCerts);
        }

        Ok(())
    }
}

/// Converts the connection configuration into a driver specific connect options type.
pub trait IntoConnectOptions<Output> {
    fn connect_options(&self) -> Output;
}

impl IntoConnectOptions<PgConnectOptions> for WarehouseConnectionConfig {
    fn connect_options(&self) -> PgConnectOptions {
        let ssl_mode = if self.tls.enabled {
            PgSslMode::VerifyFull
        } else {
            PgSslMode::Prefer
        };

        let mut options = PgConnectOptions::new_without_pgpass()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(self.password.expose_secret())
            .database(&self.database)
            .ssl_mode(ssl_mode)
            .options(self.session_parameters());

        if self.tls.enabled {
            options = options.ssl_root_cert_from_pem(self.tls.trusted_root_certs.clone().into_bytes());
        }

        options
    }
}
