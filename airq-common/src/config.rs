//! Configuration file loading
//!
//! Resolution order for the relay's settings:
//! 1. Command-line argument / environment variable (handled by the binary)
//! 2. TOML config file
//! 3. Compiled defaults
//!
//! A missing TOML file is not an error: the defaults are used and a warning is
//! logged. A file that exists but does not parse is a configuration error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Feed polled when no URLs are configured (Antelope Valley realtime feed)
pub const DEFAULT_FEED_URL: &str = "https://feeds.enviroflash.info/rss/realtime/382.xml";

/// Compiled defaults
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_ERROR_BACKOFF_MS: u64 = 15_000;
pub const DEFAULT_MAX_ERROR_BACKOFF_MS: u64 = 120_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_EVENT_CAPACITY: usize = 100;

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter (overridden by RUST_LOG)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Relay TOML configuration
///
/// Every field is optional in the file; absent fields take compiled defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Feed URLs polled each cycle, in order (may be empty)
    pub feed_urls: Vec<String>,
    /// Delay between successful cycles
    pub poll_interval_ms: u64,
    /// Delay after a cycle with a fetch failure
    pub error_backoff_ms: u64,
    /// Ceiling for the backoff after consecutive failing cycles
    pub max_error_backoff_ms: u64,
    /// Per-request HTTP timeout
    pub request_timeout_ms: u64,
    /// HTTP listen port
    pub port: u16,
    /// EventBus buffer size
    pub event_capacity: usize,
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            feed_urls: vec![DEFAULT_FEED_URL.to_string()],
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            error_backoff_ms: DEFAULT_ERROR_BACKOFF_MS,
            max_error_backoff_ms: DEFAULT_MAX_ERROR_BACKOFF_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            port: DEFAULT_PORT,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Check ranges and normalize dependent values
    ///
    /// Intervals must be non-zero; the backoff ceiling is raised to at least
    /// the initial backoff.
    pub fn validate(mut self) -> Result<Self> {
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be greater than 0".to_string()));
        }
        if self.error_backoff_ms == 0 {
            return Err(Error::Config("error_backoff_ms must be greater than 0".to_string()));
        }
        if self.request_timeout_ms == 0 {
            return Err(Error::Config("request_timeout_ms must be greater than 0".to_string()));
        }
        if self.max_error_backoff_ms < self.error_backoff_ms {
            warn!(
                "max_error_backoff_ms ({}) below error_backoff_ms ({}), raising it",
                self.max_error_backoff_ms, self.error_backoff_ms
            );
            self.max_error_backoff_ms = self.error_backoff_ms;
        }
        Ok(self)
    }
}

/// Parse TOML text into a config
pub fn parse_toml_config(content: &str) -> Result<TomlConfig> {
    toml::from_str::<TomlConfig>(content)
        .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Load the TOML config
///
/// Uses `explicit_path` when given, else the platform default path. A missing
/// file yields defaults.
pub fn load_toml_config(explicit_path: Option<&Path>) -> Result<TomlConfig> {
    let path = match explicit_path {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) => path,
            None => {
                warn!("Could not determine config directory, using compiled defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    if !path.exists() {
        warn!("Config file {} not found, using compiled defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|e| {
        warn!("Failed to read config file {}: {}", path.display(), e);
        Error::Io(e)
    })?;
    let config = parse_toml_config(&content)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Platform config path: `<config_dir>/airq/relay.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("airq").join("relay.toml"))
}
