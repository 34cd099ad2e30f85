//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `MEALMOOD_*` environment overrides.

use crate::insights::InsightConfig;
use crate::sync::SyncConfig;
use crate::timeline::EventFactory;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Prefix for environment overrides
const ENV_PREFIX: &str = "MEALMOOD_";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub insights: InsightConfig,

    #[serde(default)]
    pub timeline: TimelineConfig,

    #[serde(default)]
    pub sync: SyncConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8086
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Socket address string to bind
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Timeline configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimelineConfig {
    /// UTC offset used for local-hour rules (resting heart rate).
    /// Unset means the host's current offset.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the insight rules misbehave
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.insights
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("insights.{}", e)))
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        for path in Self::search_paths() {
            if path.exists() {
                match Self::load_with_env(&path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        // Fall back to environment-only config
        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Config file locations, in lookup order
    pub fn search_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("mealmood").join("config.toml")),
            Some(PathBuf::from("/etc/mealmood/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Event factory for the configured UTC offset
    pub fn event_factory(&self) -> Result<EventFactory, ConfigError> {
        match self.timeline.utc_offset_minutes {
            Some(minutes) => EventFactory::with_offset_minutes(minutes)
                .map_err(|e| ConfigError::Invalid(format!("timeline.utc_offset_minutes: {}", e))),
            None => Ok(EventFactory::local()),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(format!("{}{}", ENV_PREFIX, name)).ok());
    }

    /// Apply overrides from a lookup keyed by the name after the prefix
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(host) = lookup("API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("API_PORT").and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }

        // Timeline overrides
        if let Some(offset) = lookup("UTC_OFFSET_MINUTES").and_then(|o| o.parse().ok()) {
            self.timeline.utc_offset_minutes = Some(offset);
        }

        // Sync overrides
        if let Some(enabled) = lookup("SYNC_ENABLED").and_then(|e| e.parse().ok()) {
            self.sync.enabled = enabled;
        }
        if let Some(url) = lookup("SYNC_URL") {
            self.sync.base_url = url;
        }
        if let Some(user_id) = lookup("SYNC_USER") {
            self.sync.user_id = user_id;
        }

        // Logging overrides
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# MealMood Configuration
#
# Environment variables override these settings:
# - MEALMOOD_API_HOST
# - MEALMOOD_API_PORT
# - MEALMOOD_UTC_OFFSET_MINUTES
# - MEALMOOD_SYNC_ENABLED
# - MEALMOOD_SYNC_URL
# - MEALMOOD_SYNC_USER
# - MEALMOOD_LOG_LEVEL
# - MEALMOOD_LOG_FORMAT

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8086

# Allowed CORS origins
cors_origins = ["http://localhost:3000", "http://127.0.0.1:3000"]

# Request timeout in seconds
request_timeout_secs = 30

[insights]
# Window sizes are whole hours between 1 and 8760

# Moods this many hours after a meal are attributed to it
mood_window_hours = 4

# Sleep starting this many hours after a meal is attributed to it
sleep_window_hours = 12

# Meals this many hours before sleep count as late meals
pre_sleep_window_hours = 6

# Negative moods needed after a meal before it is reported (at least 1)
min_negative_moods = 2

# Timeline size below which no insights are generated
min_timeline_events = 3

[timeline]
# UTC offset for local-hour rules such as resting heart rate.
# Defaults to the host's offset when unset.
# utc_offset_minutes = 120

[sync]
# Push meals and mood entries to a remote document store
enabled = false

# Document store root
base_url = "http://localhost:8080"

# Owner of the synced records
user_id = "default-user"

# Request timeout (ms)
request_timeout_ms = 5000

# Attempts per record
max_retries = 3

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
