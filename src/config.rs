//! Configuration loader: TOML file, `.env` and environment overrides,
//! validation.
//!
//! ```toml
//! [cache]
//! dir = "data"
//! max_age_minutes = 30
//!
//! [source]
//! base_url = "http://www.wunderground.com/cgi-bin/findweather/getForecast?query="
//! timeout_secs = 30
//!
//! [thresholds]
//! hot = 70.0
//! warm = 60.0
//! cool = 50.0
//! cold = 35.0
//! freezing = 15.0
//!
//! [logging]
//! level = "info"
//! file = "attire.log"
//! timestamps = false
//! ```
//!
//! Every section and key is optional; missing values fall back to defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::file::DEFAULT_CACHE_DIR;
use crate::ingest::wunderground::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::logging::LogLevel;
use crate::model::AttireError;
use crate::policy::clothing::ClothingThresholds;
use crate::policy::freshness::DEFAULT_MAX_AGE_MINUTES;

/// Config file used when `ATTIRE_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "attire.toml";

/// Environment variable naming the config file.
pub const ENV_CONFIG_PATH: &str = "ATTIRE_CONFIG";

/// Environment variable overriding `cache.dir`.
pub const ENV_CACHE_DIR: &str = "ATTIRE_CACHE_DIR";

// ---------------------------------------------------------------------------
// Errors and validation
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Configuration validation failed: {0}")]
    Invalid(String),
}

impl From<ConfigError> for AttireError {
    fn from(err: ConfigError) -> Self {
        AttireError::Config(err.to_string())
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding one record per zip code
    pub dir: PathBuf,
    /// Tolerance for the age of cached data
    pub max_age_minutes: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_CACHE_DIR),
            max_age_minutes: DEFAULT_MAX_AGE_MINUTES as u32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Page URL up to `query=`; the zip code is appended
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<PathBuf>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub source: SourceConfig,
    pub thresholds: ClothingThresholds,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(component = "system", path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Path named by `ATTIRE_CONFIG`, or the default.
    pub fn default_path() -> PathBuf {
        std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary lookup, so tests need not touch
    /// the process environment.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_CACHE_DIR).filter(|d| !d.trim().is_empty()) {
            self.cache.dir = PathBuf::from(dir);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if let Err(message) = self.thresholds.validate() {
            result.add_error("thresholds", message);
        }

        if self.cache.max_age_minutes == 0 {
            result.add_warning(
                "cache.max_age_minutes",
                "Cache disabled (0 minutes): every run refetches",
            );
        } else if self.cache.max_age_minutes > 24 * 60 {
            result.add_warning(
                "cache.max_age_minutes",
                "Cached weather may be more than a day old",
            );
        }

        if self.source.base_url.trim().is_empty() {
            result.add_error("source.base_url", "Base URL must not be empty");
        } else if !(self.source.base_url.starts_with("http://")
            || self.source.base_url.starts_with("https://"))
        {
            result.add_error("source.base_url", "URL must use http or https scheme");
        }

        if self.source.timeout_secs == 0 {
            result.add_error("source.timeout_secs", "Timeout must be greater than 0");
        }

        if let Err(message) = self.logging.level.parse::<LogLevel>() {
            result.add_error("logging.level", message);
        }

        result
    }

    /// Validate and return warnings, or fail on the first set of errors.
    pub fn validated(self) -> Result<(Self, ValidationResult), ConfigError> {
        let validation = self.validate();
        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }
        Ok((self, validation))
    }

    pub fn max_age(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.cache.max_age_minutes))
    }

    pub fn source_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_secs)
    }

    /// Parsed log level; falls back to `Info` if the string is unknown
    /// (validation reports that case).
    pub fn log_level(&self) -> LogLevel {
        self.logging.level.parse().unwrap_or(LogLevel::Info)
    }
}
