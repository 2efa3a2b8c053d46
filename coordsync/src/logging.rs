//! Logging setup.
//!
//! Log lines go to a file through a non-blocking writer. `RUST_LOG`, when
//! set, replaces the configured level filter.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Level used when none is configured.
pub const DEFAULT_LOG_LEVEL: &str = "info";

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Log file path {0} has no file name")]
    InvalidPath(PathBuf),

    #[error("Failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open log file: {0}")]
    Appender(#[from] tracing_appender::rolling::InitError),

    #[error("Failed to install log subscriber: {0}")]
    Init(String),
}

/// Where and how much to log.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub file: PathBuf,
    pub level: String,
}

impl LoggingConfig {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    /// Sets the level, keeping the current one if `level` is not recognized.
    pub fn with_level(mut self, level: &str) -> Self {
        if is_valid_level(level) {
            self.level = level.trim().to_ascii_lowercase();
        }
        self
    }

    /// Filter directive applied when `RUST_LOG` is not set.
    ///
    /// Dependencies are capped at `warn`.
    pub fn filter_directive(&self) -> String {
        format!(
            "warn,coordsync={level},coordsync_cli={level}",
            level = self.level
        )
    }
}

/// Keeps the background log writer alive. Buffered lines are flushed when
/// this is dropped.
pub struct LoggingGuard {
    _worker: WorkerGuard,
}

/// Whether `level` names a tracing level.
pub fn is_valid_level(level: &str) -> bool {
    let level = level.trim().to_ascii_lowercase();
    LEVELS.contains(&level.as_str())
}

/// Installs the global subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let (writer, worker) = file_writer(&config.file)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directive()));

    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_timer(LocalTime::rfc_3339());

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(LoggingGuard { _worker: worker })
}

fn file_writer(path: &Path) -> Result<(NonBlocking, WorkerGuard), LoggingError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| LoggingError::InvalidPath(path.to_path_buf()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(dir)?;

    Ok(tracing_appender::non_blocking(appender))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_level_validation() {
        assert!(is_valid_level("info"));
        assert!(is_valid_level(" WARN "));
        assert!(!is_valid_level("verbose"));
        assert!(!is_valid_level(""));
    }

    #[test]
    fn test_with_level_ignores_unknown() {
        let config = LoggingConfig::new("/tmp/a.log").with_level("Debug");
        assert_eq!(config.level, "debug");

        let config = config.with_level("chatty");
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_filter_directive() {
        let config = LoggingConfig::new("a.log").with_level("trace");
        assert_eq!(
            config.filter_directive(),
            "warn,coordsync=trace,coordsync_cli=trace"
        );
    }

    #[test]
    fn test_file_writer_creates_directory_and_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs").join("coordsync.log");

        let (mut writer, guard) = file_writer(&path).unwrap();
        writer.write_all(b"hello\n").unwrap();
        drop(guard);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "hello\n");
    }

    #[test]
    fn test_file_writer_rejects_directory_path() {
        let result = file_writer(Path::new("/"));
        assert!(matches!(result, Err(LoggingError::InvalidPath(_))));
    }
}
