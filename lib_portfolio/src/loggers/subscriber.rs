use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("I/O error occurred: {0}")]
    IoError(#[from] io::Error),

    #[error("Invalid log filter {filter:?}: {source}")]
    InvalidFilter {
        filter: String,
        #[source]
        source: ParseError,
    },

    #[error("A global tracing subscriber is already installed: {0}")]
    AlreadyInitialized(#[from] TryInitError),
}

/// # Logging Options
///
/// Where log events go and how verbose they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingOptions {
    /// Filter used when `RUST_LOG` is not set (e.g. "info", "lib_portfolio=debug").
    pub level: String,
    /// Emit console logs as JSON lines instead of human-readable text.
    pub json: bool,
    /// If set, also write JSON logs to a daily rotating file in this directory.
    pub log_dir: Option<PathBuf>,
    /// File name prefix of the rotating log files.
    pub file_prefix: String,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            log_dir: None,
            file_prefix: "portfolio".to_string(),
        }
    }
}

/// Parses `level` as an `EnvFilter` directive string, ignoring `RUST_LOG`.
pub fn parse_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_new(level).map_err(|source| LoggingError::InvalidFilter {
        filter: level.to_string(),
        source,
    })
}

/// # Init Logging
///
/// Installs the global subscriber:
/// - `RUST_LOG` wins over `options.level` when it is set and valid.
/// - Console output goes to stderr so stdout stays free for command output.
/// - With `log_dir`, a JSON file layer rotates daily.
///
/// Keep the returned guard alive until exit; dropping it stops the file writer.
pub fn init_logging(options: &LoggingOptions) -> Result<Option<WorkerGuard>, LoggingError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => parse_filter(&options.level)?,
    };

    let console_text = (!options.json).then(|| {
        fmt::layer()
            .with_target(true)
            .with_ansi(true)
            .with_writer(io::stderr)
    });
    let console_json = options
        .json
        .then(|| fmt::layer().json().with_writer(io::stderr));

    let (file_layer, guard) = match &options.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = rolling::daily(dir, &options.file_prefix);
            let (writer, guard) = non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer).json();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_text)
        .with(console_json)
        .with(file_layer)
        .try_init()?;

    info!("Logging initialized with level: {}", options.level);
    Ok(guard)
}
