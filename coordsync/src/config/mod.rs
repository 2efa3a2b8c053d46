//! Configuration file handling.
//!
//! Settings live in `~/.coordsync/config.ini`. A missing file means
//! defaults; a present file only needs to name the keys it overrides.
//!
//! ```ini
//! [service]
//! url = http://localhost:8080/transform
//! timeout = 10
//!
//! [sync]
//! srs = EPSG:2056
//! debounce_ms = 500
//!
//! [map]
//! center_lon = 7.4474
//! center_lat = 46.9480
//!
//! [logging]
//! file = ~/.coordsync/coordsync.log
//! level = info
//! ```

mod keys;

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::coord::{LonLat, Srs};
use crate::logging::{LoggingConfig, DEFAULT_LOG_LEVEL};
use crate::sync::SyncConfig;
use crate::transform::DEFAULT_TIMEOUT_SECS;

pub use keys::{ConfigKey, ConfigKeyError};

/// Name of the directory under the home directory.
pub const CONFIG_DIR_NAME: &str = ".coordsync";

/// Name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Default transformation service endpoint.
pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8080/transform";

/// Default projected reference system (Swiss LV95).
pub const DEFAULT_SRS: &str = "EPSG:2056";

/// Default debounce window in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Default initial map center (Bern).
pub const DEFAULT_CENTER: LonLat = LonLat {
    lon: 7.4474,
    lat: 46.9480,
};

/// Errors that can occur while reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value in config file: {0}")]
    InvalidValue(#[from] ConfigKeyError),
}

/// `[service]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVICE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ServiceSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[sync]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncSettings {
    pub srs: Srs,
    pub debounce_ms: u64,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            srs: Srs::from_str(DEFAULT_SRS).unwrap_or_else(|_| Srs::geographic()),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

/// `[map]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    pub center: LonLat,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub file: PathBuf,
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: config_dir().join("coordsync.log"),
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub service: ServiceSettings,
    pub sync: SyncSettings,
    pub map: MapSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Loads from the default location, falling back to defaults when the
    /// file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Loads from `path`, falling back to defaults when the file does not
    /// exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    /// Saves to the default location, creating the directory if needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        self.to_ini()
            .write_to_file(path)
            .map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        for key in ConfigKey::all() {
            if let Some(value) = ini.get_from(Some(key.section()), key.key_name()) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini
    }

    /// Controller settings derived from the `[sync]` section.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig::new(self.sync.srs.clone())
            .with_debounce(Duration::from_millis(self.sync.debounce_ms))
    }

    /// Logging settings derived from the `[logging]` section.
    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::new(self.logging.file.clone()).with_level(&self.logging.level)
    }
}

/// The configuration directory, `~/.coordsync`.
///
/// Falls back to the current directory when no home directory is known.
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR_NAME)
}

/// Path of the configuration file.
pub fn config_file_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Expands a leading `~` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    match path.strip_prefix("~") {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => {
            let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
            home.join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("absent.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.sync.srs.as_str(), "EPSG:2056");
        assert_eq!(config.service.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_file_overrides_named_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(
            &path,
            "[sync]\nsrs = epsg:21781\ndebounce_ms = 250\n\n[service]\nurl = https://geo.example.com/t\n",
        )
        .unwrap();

        let config = ConfigFile::load_from(&path).unwrap();
        assert_eq!(config.sync.srs.as_str(), "EPSG:21781");
        assert_eq!(config.sync.debounce_ms, 250);
        assert_eq!(config.service.url, "https://geo.example.com/t");
        assert_eq!(config.service.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.map, MapSettings::default());
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[sync]\ndebounce_ms = soon\n").unwrap();

        let result = ConfigFile::load_from(&path);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.map.center = LonLat::new(8.5417, 47.3769);
        config.logging.level = "debug".to_string();
        config.save_to(&path).unwrap();

        let reloaded = ConfigFile::load_from(&path).unwrap();
        assert_eq!(reloaded.map.center, LonLat::new(8.5417, 47.3769));
        assert_eq!(reloaded.logging.level, "debug");
    }

    #[test]
    fn test_sync_config_from_file() {
        let mut config = ConfigFile::default();
        config.sync.debounce_ms = 300;

        let sync = config.sync_config();
        assert_eq!(sync.srs.as_str(), "EPSG:2056");
        assert_eq!(sync.debounce, Duration::from_millis(300));
    }

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        assert_eq!(expand_tilde("~/logs/a.log"), home.join("logs/a.log"));
        assert_eq!(expand_tilde("/var/log/a.log"), PathBuf::from("/var/log/a.log"));
        assert_eq!(expand_tilde("~user/a.log"), PathBuf::from("~user/a.log"));
    }

    #[test]
    fn test_config_file_path() {
        let path = config_file_path();
        assert!(path.ends_with(".coordsync/config.ini"));
    }
}
