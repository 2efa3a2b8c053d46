//! Shared command setup: configuration and logging.

use coordsync::config::{config_file_path, ConfigFile};
use coordsync::logging::{init_logging, LoggingGuard};
use tracing::{info, warn};

use crate::error::CliError;

/// Loaded configuration plus the logging guard for one CLI invocation.
pub struct CliRunner {
    config: ConfigFile,
    _log_guard: Option<LoggingGuard>,
}

impl CliRunner {
    /// Loads the configuration file and installs file logging.
    ///
    /// A logging failure is reported on stderr and does not stop the command.
    pub fn new() -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let log_guard = match init_logging(&config.logging_config()) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("Warning: logging disabled: {}", e);
                None
            }
        };

        Ok(Self {
            config,
            _log_guard: log_guard,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Logs the command being run.
    pub fn log_startup(&self, command: &str) {
        info!(
            version = coordsync::VERSION,
            command,
            config = %config_file_path().display(),
            "coordsync starting"
        );
        if !config_file_path().exists() {
            warn!("No configuration file, using defaults");
        }
    }
}
