use std::path::Path;
use std::sync::Once;

use config::shared::LogConfig;
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable that enables log output in tests.
const ENABLE_TEST_TRACING_ENV_NAME: &str = "ENABLE_TRACING";

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to create log directory `{directory}`: {source}")]
    LogDirectory {
        directory: String,
        source: std::io::Error,
    },

    #[error("failed to forward `log` records to tracing: {0}")]
    LogTracer(#[from] tracing_log::log::SetLoggerError),

    #[error("failed to install the global tracing subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Flushes buffered file output when dropped.
///
/// Keep it alive until the process is about to exit, otherwise the tail of the log file
/// may be lost.
#[must_use = "dropping the flusher stops writing to the log file"]
pub struct LogFlusher {
    _guard: WorkerGuard,
}

/// Installs console and file logging for `app_name`.
///
/// Log lines go to stdout and to `{directory}/{file_name}`. The level comes from `RUST_LOG`
/// when set and from [`LogConfig::level`] otherwise.
pub fn init_tracing(app_name: &str, log: &LogConfig) -> Result<LogFlusher, TracingError> {
    std::fs::create_dir_all(Path::new(&log.directory)).map_err(|source| {
        TracingError::LogDirectory {
            directory: log.directory.clone(),
            source,
        }
    })?;

    tracing_log::LogTracer::init()?;

    let file_appender = tracing_appender::rolling::never(&log.directory, &log.file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log.level.to_string()));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init()?;

    tracing::info!(app = app_name, log_file = %log.file_name, "tracing initialized");

    Ok(LogFlusher { _guard: guard })
}

/// Installs a test writer subscriber once per process when `ENABLE_TRACING` is set.
pub fn init_test_tracing() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        if std::env::var(ENABLE_TEST_TRACING_ENV_NAME).is_err() {
            return;
        }

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_test_writer())
            .try_init();
    });
}
