//! Configuration module for the sender.
//!
//! Settings are read from environment variables, optionally overridden by
//! command-line flags in the binary, and range-checked once at the end.

use std::env;
use std::time::Duration;

use thiserror::Error;

use crate::client::{TransportOptions, DEFAULT_ADDRESS, DEFAULT_TIMEOUT};
use crate::driver::{RunConfig, DEFAULT_COUNT, DEFAULT_INTERVAL};
use crate::generator::Pattern;

pub const ENV_ADDRESS: &str = "LUMBER_SENDER_ADDRESS";
pub const ENV_COUNT: &str = "LUMBER_SENDER_COUNT";
pub const ENV_INTERVAL: &str = "LUMBER_SENDER_INTERVAL";
pub const ENV_TIMEOUT: &str = "LUMBER_SENDER_TIMEOUT";
pub const ENV_PATTERN: &str = "LUMBER_SENDER_PATTERN";

/// Upper bound on records per run
const MAX_COUNT: u64 = 1_000_000;

/// Upper bound on the pause between sends
const MAX_INTERVAL: Duration = Duration::from_secs(3600);

/// Upper bound on the request timeout
const MAX_TIMEOUT: Duration = Duration::from_secs(600);

/// Sender configuration.
///
/// Environment variables:
/// - `LUMBER_SENDER_ADDRESS`: collector `host:port` or URL (default: localhost:5044)
/// - `LUMBER_SENDER_COUNT`: records to send (default: 10)
/// - `LUMBER_SENDER_INTERVAL`: pause between sends, e.g. `500ms`, `1s` (default: 1s)
/// - `LUMBER_SENDER_TIMEOUT`: request timeout (default: 30s)
/// - `LUMBER_SENDER_PATTERN`: `basic` or `mixed` (default: basic)
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Collector address
    pub address: String,

    /// Number of records to send
    pub count: u64,

    /// Pause between consecutive sends
    pub interval: Duration,

    /// Request timeout
    pub timeout: Duration,

    /// Record kinds to generate
    pub pattern: Pattern,

    /// Seed for reproducible field values
    pub seed: Option<u64>,
}

/// Error type for configuration loading failures.
#[derive(Debug, Error)]
#[error("Configuration error for {key}: {message}")]
pub struct ConfigError {
    pub key: String,
    pub message: String,
}

impl ConfigError {
    fn new(key: &str, message: impl Into<String>) -> Self {
        Self {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set but cannot be parsed or is
    /// out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::load_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Read environment variables over the defaults without range checks.
    ///
    /// Callers layering further sources on top must call [`Config::validate`]
    /// once everything has been applied.
    pub fn load_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(address) = env::var(ENV_ADDRESS) {
            config.address = address;
        }
        if let Ok(value) = env::var(ENV_COUNT) {
            config.count = parse_count(ENV_COUNT, &value)?;
        }
        if let Ok(value) = env::var(ENV_INTERVAL) {
            config.interval = parse_duration(ENV_INTERVAL, &value)?;
        }
        if let Ok(value) = env::var(ENV_TIMEOUT) {
            config.timeout = parse_duration(ENV_TIMEOUT, &value)?;
        }
        if let Ok(value) = env::var(ENV_PATTERN) {
            config.pattern = value
                .parse()
                .map_err(|e: String| ConfigError::new(ENV_PATTERN, e))?;
        }

        Ok(config)
    }

    /// Check ranges after all sources have been applied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address.trim().is_empty() {
            return Err(ConfigError::new("address", "address must not be empty"));
        }
        if self.count > MAX_COUNT {
            return Err(ConfigError::new(
                "count",
                format!("count {} exceeds maximum ({})", self.count, MAX_COUNT),
            ));
        }
        if self.interval > MAX_INTERVAL {
            return Err(ConfigError::new(
                "interval",
                format!("interval {:?} exceeds maximum ({:?})", self.interval, MAX_INTERVAL),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::new("timeout", "timeout must be greater than 0"));
        }
        if self.timeout > MAX_TIMEOUT {
            return Err(ConfigError::new(
                "timeout",
                format!("timeout {:?} exceeds maximum ({:?})", self.timeout, MAX_TIMEOUT),
            ));
        }
        Ok(())
    }

    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            timeout: self.timeout,
        }
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            count: self.count,
            interval: self.interval,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            count: DEFAULT_COUNT,
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            pattern: Pattern::Basic,
            seed: None,
        }
    }
}

fn parse_count(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::new(key, format!("'{}' is not a valid number", value)))
}

/// Parse a duration such as `250ms`, `1s`, `2m`, `1h`, or a bare number of seconds.
pub fn parse_duration(key: &str, value: &str) -> Result<Duration, ConfigError> {
    let raw = value.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(raw.len());
    let (number, unit) = raw.split_at(split);

    let invalid = || ConfigError::new(key, format!("'{}' is not a valid duration", value));

    let amount: f64 = number.parse().map_err(|_| invalid())?;
    let secs = match unit.trim() {
        "" | "s" => amount,
        "ms" => amount / 1000.0,
        "m" => amount * 60.0,
        "h" => amount * 3600.0,
        _ => return Err(invalid()),
    };

    Duration::try_from_secs_f64(secs).map_err(|_| invalid())
}

/// `clap` value parser wrapper around [`parse_duration`].
pub fn parse_duration_arg(value: &str) -> Result<Duration, String> {
    parse_duration("duration", value).map_err(|e| e.message)
}
