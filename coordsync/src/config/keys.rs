//! Typed access to individual configuration keys.
//!
//! Keys are addressed as `section.key`. [`ConfigKey::set`] validates the
//! value before storing it, so the file loader and `config set` share the
//! same rules.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::coord::{parse_coordinate, Srs, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};
use crate::logging::is_valid_level;

use super::{expand_tilde, ConfigFile};

/// Errors from parsing a key name or validating a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigKeyError {
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// A configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    ServiceUrl,
    ServiceTimeout,
    SyncSrs,
    SyncDebounceMs,
    MapCenterLon,
    MapCenterLat,
    LoggingFile,
    LoggingLevel,
}

impl ConfigKey {
    /// All keys, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::ServiceUrl,
            ConfigKey::ServiceTimeout,
            ConfigKey::SyncSrs,
            ConfigKey::SyncDebounceMs,
            ConfigKey::MapCenterLon,
            ConfigKey::MapCenterLat,
            ConfigKey::LoggingFile,
            ConfigKey::LoggingLevel,
        ]
    }

    /// Full `section.key` name.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::ServiceUrl => "service.url",
            ConfigKey::ServiceTimeout => "service.timeout",
            ConfigKey::SyncSrs => "sync.srs",
            ConfigKey::SyncDebounceMs => "sync.debounce_ms",
            ConfigKey::MapCenterLon => "map.center_lon",
            ConfigKey::MapCenterLat => "map.center_lat",
            ConfigKey::LoggingFile => "logging.file",
            ConfigKey::LoggingLevel => "logging.level",
        }
    }

    pub fn section(&self) -> &'static str {
        self.split().0
    }

    pub fn key_name(&self) -> &'static str {
        self.split().1
    }

    fn split(&self) -> (&'static str, &'static str) {
        let name = self.name();
        name.split_once('.').unwrap_or((name, ""))
    }

    /// Current value as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ServiceUrl => config.service.url.clone(),
            ConfigKey::ServiceTimeout => config.service.timeout_secs.to_string(),
            ConfigKey::SyncSrs => config.sync.srs.to_string(),
            ConfigKey::SyncDebounceMs => config.sync.debounce_ms.to_string(),
            ConfigKey::MapCenterLon => config.map.center.lon.to_string(),
            ConfigKey::MapCenterLat => config.map.center.lat.to_string(),
            ConfigKey::LoggingFile => config.logging.file.display().to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
        }
    }

    /// Validates `value` and stores it.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        let value = value.trim();
        match self {
            ConfigKey::ServiceUrl => {
                let url = reqwest::Url::parse(value).map_err(|e| self.invalid(value, e))?;
                if !matches!(url.scheme(), "http" | "https") {
                    return Err(self.invalid(value, "scheme must be http or https"));
                }
                config.service.url = value.to_string();
            }
            ConfigKey::ServiceTimeout => {
                let secs: u64 = value.parse().map_err(|e| self.invalid(value, e))?;
                if secs == 0 {
                    return Err(self.invalid(value, "timeout must be at least one second"));
                }
                config.service.timeout_secs = secs;
            }
            ConfigKey::SyncSrs => {
                config.sync.srs = Srs::from_str(value).map_err(|e| self.invalid(value, e))?;
            }
            ConfigKey::SyncDebounceMs => {
                config.sync.debounce_ms = value.parse().map_err(|e| self.invalid(value, e))?;
            }
            ConfigKey::MapCenterLon => {
                config.map.center.lon = self.parse_in_range(value, MIN_LON, MAX_LON)?;
            }
            ConfigKey::MapCenterLat => {
                config.map.center.lat = self.parse_in_range(value, MIN_LAT, MAX_LAT)?;
            }
            ConfigKey::LoggingFile => {
                if value.is_empty() {
                    return Err(self.invalid(value, "path must not be empty"));
                }
                config.logging.file = expand_tilde(value);
            }
            ConfigKey::LoggingLevel => {
                if !is_valid_level(value) {
                    return Err(self.invalid(value, "expected trace, debug, info, warn or error"));
                }
                config.logging.level = value.to_ascii_lowercase();
            }
        }
        Ok(())
    }

    fn parse_in_range(&self, value: &str, min: f64, max: f64) -> Result<f64, ConfigKeyError> {
        let parsed = parse_coordinate(value).ok_or_else(|| self.invalid(value, "not a number"))?;
        if !(min..=max).contains(&parsed) {
            return Err(self.invalid(value, format!("must be between {} and {}", min, max)));
        }
        Ok(parsed)
    }

    fn invalid(&self, value: &str, reason: impl fmt::Display) -> ConfigKeyError {
        ConfigKeyError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
