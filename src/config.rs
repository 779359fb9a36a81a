//! Configuration management for `AirWatch`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::AirWatchError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the `AirWatch` widget core
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AirWatchConfig {
    /// Backend API configuration
    #[serde(default)]
    pub backend: BackendConfig,
    /// View controller configuration
    #[serde(default)]
    pub controller: ControllerConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP surface for the presentation layer
    #[serde(default)]
    pub web: WebConfig,
}

/// How city data is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Check the backend once on mount and pick live or offline
    #[default]
    Auto,
    /// Always try the backend first
    Live,
    /// Never contact the backend for city data
    Offline,
}

/// Backend API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the prediction backend
    #[serde(default = "default_backend_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_backend_timeout")]
    pub timeout_seconds: u32,
    /// Resolution mode
    #[serde(default)]
    pub mode: BackendMode,
}

/// View controller settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// City selected on mount
    #[serde(default = "default_city")]
    pub default_city: String,
    /// Seconds between backend health checks
    #[serde(default = "default_health_check_interval")]
    pub health_check_interval_seconds: u32,
    /// Seconds between automatic refreshes, 0 disables
    #[serde(default)]
    pub auto_refresh_seconds: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Web server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// Directory with the built presentation bundle
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

// Default value functions
fn default_backend_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_backend_timeout() -> u32 {
    10
}

fn default_city() -> String {
    "Ciudad de México".to_string()
}

fn default_health_check_interval() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_web_port() -> u16 {
    8080
}

fn default_static_dir() -> String {
    "frontend/dist".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_base_url(),
            timeout_seconds: default_backend_timeout(),
            mode: BackendMode::default(),
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            default_city: default_city(),
            health_check_interval_seconds: default_health_check_interval(),
            auto_refresh_seconds: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: default_web_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl BackendConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.into())
    }
}

impl ControllerConfig {
    #[must_use]
    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval_seconds.into())
    }

    /// `None` when automatic refresh is disabled
    #[must_use]
    pub fn auto_refresh_interval(&self) -> Option<Duration> {
        (self.auto_refresh_seconds > 0)
            .then(|| Duration::from_secs(self.auto_refresh_seconds.into()))
    }
}

impl AirWatchConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // AIRWATCH__BACKEND__BASE_URL=... overrides backend.base_url
        builder = builder.add_source(
            Environment::with_prefix("AIRWATCH")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AirWatchConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("airwatch").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.backend.base_url.is_empty() {
            self.backend.base_url = default_backend_base_url();
        }
        if self.backend.timeout_seconds == 0 {
            self.backend.timeout_seconds = default_backend_timeout();
        }
        if self.controller.default_city.is_empty() {
            self.controller.default_city = default_city();
        }
        if self.controller.health_check_interval_seconds == 0 {
            self.controller.health_check_interval_seconds = default_health_check_interval();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.web.static_dir.is_empty() {
            self.web.static_dir = default_static_dir();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.backend.timeout_seconds > 120 {
            return Err(
                AirWatchError::config("Backend timeout cannot exceed 120 seconds").into(),
            );
        }

        if self.controller.health_check_interval_seconds > 3600 {
            return Err(AirWatchError::config(
                "Health check interval cannot exceed 3600 seconds (1 hour)",
            )
            .into());
        }

        if self.controller.auto_refresh_seconds > 86_400 {
            return Err(AirWatchError::config(
                "Auto refresh interval cannot exceed 86400 seconds (1 day)",
            )
            .into());
        }

        if self.web.port == 0 {
            return Err(AirWatchError::config("Web port cannot be 0").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AirWatchError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AirWatchError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.backend.base_url.starts_with("http://")
            && !self.backend.base_url.starts_with("https://")
        {
            return Err(AirWatchError::config(
                "Backend base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        if self.controller.default_city.trim().is_empty() {
            return Err(AirWatchError::config("Default city cannot be blank").into());
        }

        Ok(())
    }
}
