use std::path::PathBuf;
use std::sync::OnceLock;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LogSetupError {
    #[error("invalid log filter {0:?}")]
    Filter(String),
    #[error("failed to prepare log directory {path:?}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create log file appender")]
    Appender(#[from] tracing_appender::rolling::InitError),
    #[error("logging already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Filter used when `RUST_LOG` is unset, e.g. `"info"` or `"tyre_thermal=debug"`.
    pub base_level: String,
    pub file_prefix: String,
    pub directory: PathBuf,
    /// Events at or above this level are mirrored to stderr. Stdout is left alone so it
    /// can carry serialized data.
    pub console_level: Level,
    pub max_log_files: usize,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            base_level: "info".to_string(),
            file_prefix: "tyre".to_string(),
            directory: PathBuf::from("logs"),
            console_level: Level::WARN,
            max_log_files: 5,
        }
    }
}

impl LogOptions {
    pub fn new(base_level: &str, file_prefix: &str) -> Self {
        Self {
            base_level: base_level.to_string(),
            file_prefix: file_prefix.to_string(),
            ..Default::default()
        }
    }
}

/// Daily-rolling file log plus a stderr console layer.
pub fn setup_logging(options: &LogOptions) -> Result<(), LogSetupError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => base_filter(&options.base_level)?,
    };

    std::fs::create_dir_all(&options.directory).map_err(|source| LogSetupError::Directory {
        path: options.directory.clone(),
        source,
    })?;

    let file_appender = tracing_appender::rolling::Builder::new()
        .rotation(tracing_appender::rolling::Rotation::DAILY)
        .filename_prefix(&options.file_prefix)
        .filename_suffix("log")
        .max_log_files(options.max_log_files)
        .build(&options.directory)?;

    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
    LOG_GUARD
        .set(guard)
        .map_err(|_| LogSetupError::AlreadyInitialized)?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_ansi(true)
        .with_writer(std::io::stderr.with_min_level(options.console_level));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false)
        .with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|_| LogSetupError::AlreadyInitialized)
}

fn base_filter(base_level: &str) -> Result<EnvFilter, LogSetupError> {
    EnvFilter::try_new(base_level).map_err(|_| LogSetupError::Filter(base_level.to_string()))
}
