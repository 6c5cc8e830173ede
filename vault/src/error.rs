//! Error types and result definitions for vault loading.
//!
//! [`VaultError`] carries a classification, a static description, optional dynamic detail,
//! the originating error and the call site where it was raised, so a single log line is
//! enough to tell which stream or table a run failed on.

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::error;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

/// Result type for vault operations.
pub type VaultResult<T> = Result<T, VaultError>;

/// Main error type for vault operations.
#[derive(Debug, Clone)]
pub struct VaultError {
    kind: ErrorKind,
    description: Cow<'static, str>,
    detail: Option<Cow<'static, str>>,
    source: Option<Arc<dyn error::Error + Send + Sync>>,
    location: &'static Location<'static>,
    backtrace: Arc<Backtrace>,
}

/// Categories of failures raised while loading the vault.
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // Configuration
    ConfigError,

    // Session
    EngineConnectionFailed,
    AuthenticationError,

    // Query execution
    EngineQueryFailed,
    StreamMissing,
    TargetTableMissing,

    // Data
    InvalidData,

    // Workflow
    InvalidState,

    IoError,
    Unknown,
}

impl VaultError {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    pub fn backtrace(&self) -> &Backtrace {
        self.backtrace.as_ref()
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// Attaches the originating error, exposed through [`error::Error::source`].
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        self.source = Some(Arc::new(source));
        self
    }

    #[track_caller]
    fn from_components(
        kind: ErrorKind,
        description: Cow<'static, str>,
        detail: Option<Cow<'static, str>>,
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    ) -> Self {
        VaultError {
            kind,
            description,
            detail,
            source,
            location: Location::caller(),
            backtrace: Arc::new(Backtrace::capture()),
        }
    }
}

impl PartialEq for VaultError {
    fn eq(&self, other: &VaultError) -> bool {
        self.kind == other.kind && self.description == other.description
    }
}

impl fmt::Display for VaultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{:?}] {} @ {}:{}:{}",
            self.kind,
            self.description,
            self.location.file(),
            self.location.line(),
            self.location.column()
        )?;

        if let Some(detail) = self.detail.as_deref() {
            if detail.trim().is_empty() {
                write!(f, "\n  Detail: <empty>")?;
            } else {
                write!(f, "\n  Detail:")?;
                for line in detail.lines() {
                    write!(f, "\n    {line}")?;
                }
            }
        }

        Ok(())
    }
}

impl error::Error for VaultError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn error::Error + 'static))
    }
}

/// Creates a [`VaultError`] from an error kind and static description.
impl From<(ErrorKind, &'static str)> for VaultError {
    #[track_caller]
    fn from((kind, description): (ErrorKind, &'static str)) -> VaultError {
        VaultError::from_components(kind, Cow::Borrowed(description), None, None)
    }
}

/// Creates a [`VaultError`] from an error kind, static description and dynamic detail.
impl<D> From<(ErrorKind, &'static str, D)> for VaultError
where
    D: Into<Cow<'static, str>>,
{
    #[track_caller]
    fn from((kind, description, detail): (ErrorKind, &'static str, D)) -> VaultError {
        VaultError::from_components(kind, Cow::Borrowed(description), Some(detail.into()), None)
    }
}

impl From<std::io::Error> for VaultError {
    #[track_caller]
    fn from(err: std::io::Error) -> VaultError {
        let detail = err.to_string();
        VaultError::from_components(
            ErrorKind::IoError,
            Cow::Borrowed("I/O operation failed"),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}

/// Converts [`sqlx::Error`] into a [`VaultError`], classifying database errors by SQLSTATE.
impl From<sqlx::Error> for VaultError {
    #[track_caller]
    fn from(err: sqlx::Error) -> VaultError {
        let (kind, description) = match &err {
            sqlx::Error::Database(database_error) => {
                classify_sqlstate(database_error.code().as_deref())
            }
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) => (
                ErrorKind::EngineConnectionFailed,
                "Warehouse connection failed",
            ),
            sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => (
                ErrorKind::EngineConnectionFailed,
                "Warehouse session is not available",
            ),
            sqlx::Error::Configuration(_) => {
                (ErrorKind::ConfigError, "Warehouse connection misconfigured")
            }
            _ => (ErrorKind::EngineQueryFailed, "Warehouse operation failed"),
        };

        let detail = err.to_string();
        VaultError::from_components(
            kind,
            Cow::Borrowed(description),
            Some(Cow::Owned(detail)),
            Some(Arc::new(err)),
        )
    }
}

/// Maps a SQLSTATE code to an error kind and description.
fn classify_sqlstate(code: Option<&str>) -> (ErrorKind, &'static str) {
    match code {
        Some("42P01") => (ErrorKind::TargetTableMissing, "Relation does not exist"),
        Some("42703") => (ErrorKind::InvalidData, "Column does not exist"),
        Some("42501") => (ErrorKind::AuthenticationError, "Permission denied"),
        Some(code) if code.starts_with("28") => (
            ErrorKind::AuthenticationError,
            "Warehouse authentication failed",
        ),
        Some(code) if code.starts_with("08") => (
            ErrorKind::EngineConnectionFailed,
            "Warehouse connection failed",
        ),
        Some(code) if code.starts_with("23") => {
            (ErrorKind::InvalidData, "Integrity constraint violated")
        }
        Some(code) if code.starts_with("22") => (ErrorKind::InvalidData, "Invalid data"),
        _ => (ErrorKind::EngineQueryFailed, "Warehouse query failed"),
    }
}
