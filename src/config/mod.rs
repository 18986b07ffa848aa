// Config module - logging configuration, defaults and file loading

mod env;

pub use env::{Environment, ENV_KEYS};

use crate::error::{LogError, Result};
use crate::logs::{RotationPolicy, RoutingTable, Severity, ACCESS_PREFIX};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the default log directory, relative to the working directory
pub const LOG_DIR_NAME: &str = "logs";

/// Default retention window (20 days)
pub const DEFAULT_MAX_AGE_SECS: u64 = 20 * 24 * 60 * 60;

/// Default rotation interval (24 hours)
pub const DEFAULT_ROTATION_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Default rotation size (5MB)
pub const DEFAULT_ROTATION_SIZE_BYTES: u64 = 5 * 1024 * 1024;

/// Configuration shared by the general and access channels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Directory holding all log files
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Rotated files older than this are deleted (0 keeps them forever)
    #[serde(default = "default_max_age")]
    pub max_age_secs: u64,

    /// Age of the active file that triggers rotation (0 disables)
    #[serde(default = "default_rotation_interval")]
    pub rotation_interval_secs: u64,

    /// Size of the active file that triggers rotation (0 disables)
    #[serde(default = "default_rotation_size")]
    pub rotation_size_bytes: u64,

    /// Echo records to stdout; only honored in a development environment
    #[serde(default = "default_console_echo")]
    pub console_echo: bool,

    /// Records below this severity are discarded
    #[serde(default = "default_level")]
    pub level: Severity,

    /// Severity-to-file routing of the general channel
    #[serde(default)]
    pub routing: RoutingTable,
}

// Default value functions for serde
fn default_log_dir() -> PathBuf {
    Path::new(".").join(LOG_DIR_NAME)
}

fn default_max_age() -> u64 {
    DEFAULT_MAX_AGE_SECS
}

fn default_rotation_interval() -> u64 {
    DEFAULT_ROTATION_INTERVAL_SECS
}

fn default_rotation_size() -> u64 {
    DEFAULT_ROTATION_SIZE_BYTES
}

fn default_console_echo() -> bool {
    true
}

fn default_level() -> Severity {
    Severity::Info
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            max_age_secs: default_max_age(),
            rotation_interval_secs: default_rotation_interval(),
            rotation_size_bytes: default_rotation_size(),
            console_echo: default_console_echo(),
            level: default_level(),
            routing: RoutingTable::default(),
        }
    }
}

impl LogConfig {
    /// Default configuration writing into `log_dir`
    pub fn with_dir<P: AsRef<Path>>(log_dir: P) -> Self {
        Self {
            log_dir: log_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Load a configuration from a file (supports TOML and JSON)
    pub fn from_file(path: &Path) -> Result<LogConfig> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| LogError::ConfigError(format!("Failed to read config file: {}", e)))?;

        // Determine format based on file extension
        let extension = path.extension().and_then(|s| s.to_str()).unwrap_or("");

        let mut config = match extension {
            "toml" => toml::from_str::<LogConfig>(&contents)
                .map_err(|e| LogError::InvalidConfig(format!("Failed to parse TOML: {}", e)))?,
            "json" => serde_json::from_str::<LogConfig>(&contents)
                .map_err(|e| LogError::InvalidConfig(format!("Failed to parse JSON: {}", e)))?,
            _ => {
                return Err(LogError::InvalidConfig(format!(
                    "Unsupported file format: {}. Use .toml or .json",
                    extension
                )))
            }
        };

        config.expand_env_vars();
        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Zero thresholds are valid and disable their axis.
    pub fn validate(&self) -> Result<()> {
        if self.log_dir.as_os_str().is_empty() {
            return Err(LogError::ConfigValidationError(
                "log_dir must not be empty".to_string(),
            ));
        }

        self.routing.validate()?;

        if self.routing.prefixes().contains(&ACCESS_PREFIX) {
            return Err(LogError::ConfigValidationError(format!(
                "File prefix '{}' is reserved for the access channel",
                ACCESS_PREFIX
            )));
        }

        Ok(())
    }

    /// Expand `$VAR` and `${VAR}` in the log directory
    fn expand_env_vars(&mut self) {
        let mut dir = self.log_dir.to_string_lossy().into_owned();
        if !dir.contains('$') {
            return;
        }

        for (key, value) in std::env::vars() {
            dir = dir.replace(&format!("${{{}}}", key), &value);
            dir = dir.replace(&format!("${}", key), &value);
        }
        self.log_dir = PathBuf::from(dir);
    }

    /// Get the retention window as Duration
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    /// Get the rotation interval as Duration
    pub fn rotation_interval(&self) -> Duration {
        Duration::from_secs(self.rotation_interval_secs)
    }

    /// Retention window, `None` when retention is disabled
    pub fn retention(&self) -> Option<Duration> {
        (self.max_age_secs > 0).then(|| self.max_age())
    }

    /// Rotation thresholds of this configuration
    pub fn rotation_policy(&self) -> RotationPolicy {
        RotationPolicy::new(self.rotation_interval(), self.rotation_size_bytes)
    }
}
