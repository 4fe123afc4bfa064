//! airq-relay configuration
//!
//! Priority per setting: command line / `AIRQ_*` environment variable, then
//! the TOML file, then compiled defaults.

use airq_common::config::{load_toml_config, TomlConfig};
use airq_common::time::millis_to_duration;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::poller::PollerConfig;

/// Command-line arguments for airq-relay
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "airq-relay")]
#[command(about = "Polls air-quality feeds and republishes readings to live subscribers")]
#[command(version)]
pub struct Args {
    /// TOML config file (default: <config dir>/airq/relay.toml)
    #[arg(short, long, env = "AIRQ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Feed URL to poll; repeat or comma-separate for several
    #[arg(long = "feed-url", env = "AIRQ_FEED_URLS", value_delimiter = ',')]
    pub feed_urls: Vec<String>,

    /// Delay between cycles in milliseconds
    #[arg(long, env = "AIRQ_POLL_INTERVAL_MS")]
    pub poll_interval_ms: Option<u64>,

    /// Delay after a failed fetch in milliseconds
    #[arg(long, env = "AIRQ_ERROR_BACKOFF_MS")]
    pub error_backoff_ms: Option<u64>,

    /// Ceiling for repeated fetch failures in milliseconds
    #[arg(long, env = "AIRQ_MAX_ERROR_BACKOFF_MS")]
    pub max_error_backoff_ms: Option<u64>,

    /// HTTP request timeout in milliseconds
    #[arg(long, env = "AIRQ_REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: Option<u64>,

    /// Port to listen on
    #[arg(short, long, env = "AIRQ_PORT")]
    pub port: Option<u16>,

    /// Default log filter (RUST_LOG takes precedence)
    #[arg(long, env = "AIRQ_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Resolved relay configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub feed_urls: Vec<String>,
    pub poll_interval: Duration,
    pub error_backoff: Duration,
    pub max_error_backoff: Duration,
    pub request_timeout: Duration,
    pub port: u16,
    pub event_capacity: usize,
    pub log_level: String,
}

impl RelayConfig {
    /// Load the TOML file named by `args` (or the default path) and merge
    pub fn load(args: &Args) -> Result<Self> {
        let toml = load_toml_config(args.config.as_deref())?;
        Self::resolve(args, toml)
    }

    /// Overlay command-line values on a TOML config
    pub fn resolve(args: &Args, toml: TomlConfig) -> Result<Self> {
        let mut merged = toml;

        if !args.feed_urls.is_empty() {
            merged.feed_urls = args.feed_urls.clone();
        }
        if let Some(ms) = args.poll_interval_ms {
            merged.poll_interval_ms = ms;
        }
        if let Some(ms) = args.error_backoff_ms {
            merged.error_backoff_ms = ms;
        }
        if let Some(ms) = args.max_error_backoff_ms {
            merged.max_error_backoff_ms = ms;
        }
        if let Some(ms) = args.request_timeout_ms {
            merged.request_timeout_ms = ms;
        }
        if let Some(port) = args.port {
            merged.port = port;
        }
        if let Some(level) = &args.log_level {
            merged.logging.level = level.clone();
        }

        let merged = merged.validate()?;

        let feed_urls: Vec<String> = merged
            .feed_urls
            .into_iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();
        if let Some(bad) = feed_urls
            .iter()
            .find(|url| !(url.starts_with("http://") || url.starts_with("https://")))
        {
            return Err(Error::Config(format!("feed URL must be http(s): {}", bad)));
        }

        Ok(Self {
            feed_urls,
            poll_interval: millis_to_duration(merged.poll_interval_ms),
            error_backoff: millis_to_duration(merged.error_backoff_ms),
            max_error_backoff: millis_to_duration(merged.max_error_backoff_ms),
            request_timeout: millis_to_duration(merged.request_timeout_ms),
            port: merged.port,
            event_capacity: merged.event_capacity,
            log_level: merged.logging.level,
        })
    }

    /// Settings the poller needs
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            feed_urls: self.feed_urls.clone(),
            poll_interval: self.poll_interval,
            error_backoff: self.error_backoff,
            max_error_backoff: self.max_error_backoff,
        }
    }
}
