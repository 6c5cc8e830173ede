use std::fmt;

use serde::{Deserialize, Serialize};

fn default_directory() -> String {
    LogConfig::DEFAULT_DIRECTORY.to_string()
}

fn default_file_name() -> String {
    LogConfig::DEFAULT_FILE_NAME.to_string()
}

/// Where and how verbosely the loader writes its log file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LogConfig {
    #[serde(default = "default_directory")]
    pub directory: String,
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// Level used when `RUST_LOG` is not set.
    #[serde(default)]
    pub level: LogLevel,
}

impl LogConfig {
    pub const DEFAULT_DIRECTORY: &'static str = ".";
    pub const DEFAULT_FILE_NAME: &'static str = "dv_processing.log";
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            file_name: default_file_name(),
            level: LogLevel::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Very verbose, low priority information.
    Trace,
    Debug,
    #[default]
    Info,
    /// Hazardous situations.
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(s)
    }
}
