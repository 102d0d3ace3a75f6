//! Host configuration for the word list core.
//!
//! Read from a JSON document; every field has a default so an empty object
//! is a valid configuration.

use crate::logging::default_log_level;
use crate::mirror::MirrorAddress;
use crate::service::hooks::HapticPulse;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_FILE_NAME: &str = "wordguard.sqlite3";
pub const DEFAULT_MIRROR_ADDRESS: &str = "content://wordguard.provider.StorageProvider/words";

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WordGuardConfig {
    /// Local word store file.
    pub db_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling logs; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    /// Provider-style address of the external mirror.
    pub mirror_address: String,
    /// Whether the host platform can wipe the mirror.
    pub mirror_wipe_supported: bool,
    pub haptic_pulse: HapticPulse,
}

impl Default for WordGuardConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
            mirror_address: DEFAULT_MIRROR_ADDRESS.to_string(),
            mirror_wipe_supported: true,
            haptic_pulse: HapticPulse::default(),
        }
    }
}

impl WordGuardConfig {
    /// Reads and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mirror_address()?;
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("db_path cannot be empty".to_string()));
        }
        if self.haptic_pulse.duration_ms == 0 {
            return Err(ConfigError::Invalid(
                "haptic_pulse.duration_ms must be positive".to_string(),
            ));
        }
        if self.haptic_pulse.amplitude == 0 {
            return Err(ConfigError::Invalid(
                "haptic_pulse.amplitude must be within 1..=255".to_string(),
            ));
        }
        Ok(())
    }

    pub fn mirror_address(&self) -> Result<MirrorAddress, ConfigError> {
        self.mirror_address
            .parse::<MirrorAddress>()
            .map_err(|err| ConfigError::Invalid(format!("mirror_address: {err}")))
    }
}
