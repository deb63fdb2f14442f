//! Traffic generator producing realistic-looking synthetic log records.
//!
//! The generator walks a sequence index and, depending on the configured
//! [`Pattern`], emits either plain messages with a cycling level or a
//! round-robin mix of access, metric and error records with randomized
//! field values.

use std::collections::HashMap;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use crate::record::{AccessLog, ErrorLog, Level, LogMessage, Metadata, MetricLog, Record};

/// Service name used for plain messages.
pub const BASIC_SERVICE: &str = "lumber-sender";

/// Level sequence cycled through by the basic pattern.
const LEVEL_CYCLE: [Level; 8] = [
    Level::Info,
    Level::Debug,
    Level::Warn,
    Level::Error,
    Level::Info,
    Level::Info,
    Level::Debug,
    Level::Info,
];

const METHODS: [&str; 5] = ["GET", "POST", "PUT", "DELETE", "PATCH"];
const PATHS: [&str; 5] = ["/api/users", "/api/orders", "/api/products", "/health", "/metrics"];
const STATUS_CODES: [i64; 6] = [200, 201, 204, 400, 404, 500];
const USER_AGENT: &str = "Mozilla/5.0 (compatible; Test/1.0)";

/// (name, unit, exclusive upper bound of the value)
const METRICS: [(&str, &str, f64); 4] = [
    ("cpu_usage", "percent", 100.0),
    ("memory_usage", "MB", 2048.0),
    ("request_rate", "req/s", 1000.0),
    ("error_rate", "errors/s", 10.0),
];

/// (message, error code)
const ERRORS: [(&str, &str); 4] = [
    ("Database connection timeout", "DB_TIMEOUT"),
    ("Unable to parse request body", "PARSE_ERROR"),
    ("Authentication failed", "AUTH_FAILED"),
    ("Service unavailable", "SERVICE_DOWN"),
];

/// Which record kinds the generator emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pattern {
    /// Plain messages only, cycling through log levels.
    #[default]
    Basic,
    /// Access, metric and error records in round-robin order.
    Mixed,
}

impl Pattern {
    pub fn name(&self) -> &'static str {
        match self {
            Pattern::Basic => "basic",
            Pattern::Mixed => "mixed",
        }
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Pattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Pattern::Basic),
            "mixed" | "advanced" => Ok(Pattern::Mixed),
            other => Err(format!("unknown pattern '{}', expected 'basic' or 'mixed'", other)),
        }
    }
}

/// Configuration for the traffic generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Record kinds to emit
    pub pattern: Pattern,

    /// Value of the `environment` metadata/tag field
    pub environment: String,

    /// Value of the `host` field on plain messages
    pub host: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            pattern: Pattern::Basic,
            environment: "testing".to_string(),
            host: "experimentation-host".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn with_pattern(pattern: Pattern) -> Self {
        Self {
            pattern,
            ..Self::default()
        }
    }
}

/// Synthetic log traffic generator.
///
/// Owns its random number generator so that a seeded generator always
/// produces the same field values for the same indices.
pub struct TrafficGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl TrafficGenerator {
    /// Create a generator seeded from OS entropy.
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a deterministic generator.
    pub fn with_seed(config: GeneratorConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(GeneratorConfig::default())
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate the record for the zero-based iteration `index`.
    pub fn generate(&mut self, index: u64) -> Record {
        match self.config.pattern {
            Pattern::Basic => self.basic_message(index).into(),
            Pattern::Mixed => match index % 3 {
                0 => self.access_log(index).into(),
                1 => self.metric_log(index).into(),
                _ => self.error_log(index).into(),
            },
        }
    }

    /// Generate `count` consecutive records starting at `start`.
    ///
    /// Indices wrap around at `u64::MAX`.
    pub fn generate_batch(&mut self, start: u64, count: usize) -> Vec<Record> {
        (0..count as u64)
            .map(|offset| self.generate(start.wrapping_add(offset)))
            .collect()
    }

    fn basic_message(&self, index: u64) -> LogMessage {
        let sequence = index.wrapping_add(1);
        let level = LEVEL_CYCLE[(index % LEVEL_CYCLE.len() as u64) as usize];

        let mut metadata = Metadata::new();
        metadata.insert("sequence".to_string(), json!(sequence));
        metadata.insert("environment".to_string(), json!(self.config.environment));
        metadata.insert("host".to_string(), json!(self.config.host));

        LogMessage::new(
            level,
            BASIC_SERVICE,
            format!("Test message number {} from {}", sequence, BASIC_SERVICE),
            metadata,
        )
    }

    fn access_log(&mut self, seq: u64) -> AccessLog {
        let method = METHODS[self.rng.gen_range(0..METHODS.len())];
        let path = PATHS[self.rng.gen_range(0..PATHS.len())];
        let client_ip = format!("192.168.1.{}", self.rng.gen_range(0..255));
        let status_code = STATUS_CODES[self.rng.gen_range(0..STATUS_CODES.len())];
        let duration_ms = self.rng.gen_range(0.0..1000.0);

        let mut metadata = Metadata::new();
        metadata.insert("sequence".to_string(), json!(seq));
        metadata.insert("request_id".to_string(), json!(format!("req-{}", seq)));
        metadata.insert("environment".to_string(), json!(self.config.environment));

        AccessLog::new(
            "api-gateway",
            method,
            path,
            client_ip,
            status_code,
            duration_ms,
            metadata,
        )
        .with_user_agent(USER_AGENT)
    }

    fn metric_log(&mut self, seq: u64) -> MetricLog {
        let (name, unit, upper) = METRICS[self.rng.gen_range(0..METRICS.len())];
        let value = self.rng.gen_range(0.0..upper);

        let mut tags = HashMap::new();
        tags.insert("host".to_string(), "server-01".to_string());
        tags.insert("environment".to_string(), self.config.environment.clone());
        tags.insert("region".to_string(), "us-east-1".to_string());

        let mut metadata = Metadata::new();
        metadata.insert("sequence".to_string(), json!(seq));

        MetricLog::new("monitoring", name, unit, value, tags, metadata)
    }

    fn error_log(&mut self, seq: u64) -> ErrorLog {
        let (message, code) = ERRORS[self.rng.gen_range(0..ERRORS.len())];

        let mut metadata = Metadata::new();
        metadata.insert("sequence".to_string(), json!(seq));
        metadata.insert("environment".to_string(), json!(self.config.environment));
        metadata.insert("trace_id".to_string(), json!(format!("trace-{}", seq)));

        ErrorLog::new(
            "backend-service",
            message,
            Some(code.to_string()),
            Some(format!("at handler.go:123\nat middleware.go:45\nat main.go:{}", seq)),
            metadata,
        )
    }
}

impl Default for TrafficGenerator {
    fn default() -> Self {
        Self::with_defaults()
    }
}
