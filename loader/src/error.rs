use std::backtrace::Backtrace;
use std::io;

use config::LoadConfigError;
use config::shared::ValidationError;
use telemetry::TracingError;
use thiserror::Error;
use vault::error::VaultError;

/// Result type for loader operations.
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Everything that can make a loader invocation fail.
///
/// Failures before the first session is opened are kept apart from failures of the run
/// itself, so the exit code tells a broken deployment from a broken load.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// Configuration files or environment overrides could not be read.
    #[error("failed to load configuration: {0}")]
    LoadConfig(#[from] LoadConfigError),
    /// The configuration was read but is not usable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ValidationError),
    /// `APP_ENVIRONMENT` names an unknown environment.
    #[error("invalid environment: {0}")]
    Environment(#[source] io::Error),
    /// Console or file logging could not be installed.
    #[error("failed to initialize logging: {0}")]
    Tracing(#[from] TracingError),
    /// The async runtime could not be started.
    #[error("failed to start the runtime: {0}")]
    Runtime(#[source] io::Error),
    /// A session or merge failed.
    #[error(transparent)]
    Vault(#[from] VaultError),
}

impl LoaderError {
    /// Exit code for configuration and environment problems.
    const SETUP_FAILURE: u8 = 2;
    /// Exit code for failed loads.
    const LOAD_FAILURE: u8 = 1;

    /// Returns a short category label for this error.
    pub fn category(&self) -> &'static str {
        match self {
            LoaderError::LoadConfig(_)
            | LoaderError::InvalidConfig(_)
            | LoaderError::Environment(_) => "configuration error",
            LoaderError::Tracing(_) => "logging error",
            LoaderError::Runtime(_) => "runtime error",
            LoaderError::Vault(_) => "load error",
        }
    }

    /// Whether the failure happened before any warehouse work was attempted.
    pub fn is_setup_failure(&self) -> bool {
        !matches!(self, LoaderError::Vault(_))
    }

    /// Process exit status reported for this error.
    pub fn exit_status(&self) -> u8 {
        if self.is_setup_failure() {
            Self::SETUP_FAILURE
        } else {
            Self::LOAD_FAILURE
        }
    }

    /// Backtrace captured where the underlying vault error was raised.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self {
            LoaderError::Vault(err) => Some(err.backtrace()),
            _ => None,
        }
    }

    /// Multi-line summary for stderr: the error followed by its chain of causes.
    pub fn render_report(&self) -> String {
        let causes = std::iter::successors(std::error::Error::source(self), |err| err.source())
            .map(|err| format!("  caused by: {err}\n"))
            .collect::<String>();

        format!("dv loader failed ({}): {self}\n{causes}", self.category())
    }
}
