//! Data Vault loader binary.
//!
//! Loads the configuration, initializes logging to the console and the log file, and runs a
//! single pass over every configured change stream. Any failure is logged, reported on stderr
//! and turns into a non-zero exit code.

use std::process::ExitCode;

use config::Environment;
use config::shared::{LoaderConfig, LogConfig};
use telemetry::{LogFlusher, init_tracing};
use tracing::{error, info};

use crate::core::run_loader_with_config;
use crate::error::{LoaderError, LoaderResult};
use crate::loader_config::load_loader_config;

mod core;
mod error;
mod loader_config;

const APP_NAME: &str = env!("CARGO_BIN_NAME");

fn main() -> ExitCode {
    let loader_config = match load_loader_config() {
        Ok(loader_config) => loader_config,
        Err(err) => return report_startup_failure(&err, &LogConfig::default()),
    };

    // The flusher must outlive the runtime so the last log lines reach the file.
    let _log_flusher = match init_tracing(APP_NAME, &loader_config.log) {
        Ok(flusher) => flusher,
        Err(err) => return report_failure(&LoaderError::from(err)),
    };

    match run(loader_config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_failure(&err),
    }
}

fn run(loader_config: LoaderConfig) -> LoaderResult<()> {
    // Merges run one after another on a single session, one thread is enough.
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(LoaderError::Runtime)?
        .block_on(async_main(loader_config))
}

async fn async_main(loader_config: LoaderConfig) -> LoaderResult<()> {
    let environment = Environment::load().map_err(LoaderError::Environment)?;
    info!(%environment, "loader starting");

    let summary = run_loader_with_config(loader_config).await?;

    info!(
        streams_scanned = summary.streams_scanned,
        tables_merged = summary.tables_merged,
        rows_affected = summary.rows_affected,
        "loader finished"
    );

    Ok(())
}

/// Reports a failure that happened before the configured logging was installed.
///
/// The configured log location is unknown at this point, so the error is written to the log
/// file described by `fallback` instead.
fn report_startup_failure(err: &LoaderError, fallback: &LogConfig) -> ExitCode {
    let _log_flusher: Option<LogFlusher> = match init_tracing(APP_NAME, fallback) {
        Ok(flusher) => Some(flusher),
        Err(tracing_err) => {
            eprintln!("failed to initialize fallback logging: {tracing_err}");
            None
        }
    };

    report_failure(err)
}

fn report_failure(err: &LoaderError) -> ExitCode {
    match err.backtrace() {
        Some(backtrace) => error!(
            category = err.category(),
            error = %err,
            %backtrace,
            "loader failed"
        ),
        None => error!(category = err.category(), error = %err, "loader failed"),
    }
    eprint!("{}", err.render_report());

    ExitCode::from(err.exit_status())
}
