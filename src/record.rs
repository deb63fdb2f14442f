//! Record module defining the synthetic log records sent to the collector.
//!
//! Four record kinds are supported: plain messages, HTTP access logs, metric
//! data points and error traces. Every record is stamped with its creation
//! time and carries a severity level, a service name and free-form metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Free-form metadata attached to every record.
pub type Metadata = HashMap<String, serde_json::Value>;

/// Log severity levels as understood by the downstream collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    /// Get the level name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify an HTTP status code into a severity level.
///
/// `>= 500` is an error, `400..=499` a warning, anything else informational.
/// Total over the integer domain; out-of-range codes are not rejected.
pub fn classify_status(status_code: i64) -> Level {
    match status_code {
        code if code >= 500 => Level::Error,
        code if code >= 400 => Level::Warn,
        _ => Level::Info,
    }
}

/// A plain log message with a caller-supplied level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMessage {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub service: String,
    pub message: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl LogMessage {
    pub fn new(
        level: Level,
        service: impl Into<String>,
        message: impl Into<String>,
        metadata: Metadata,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            service: service.into(),
            message: message.into(),
            metadata,
        }
    }
}

/// An HTTP access log entry. The level is derived from the status code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessLog {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub service: String,
    pub method: String,
    pub path: String,
    pub status_code: i64,
    pub duration_ms: f64,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub user_agent: Option<String>,
    pub client_ip: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl AccessLog {
    pub fn new(
        service: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
        client_ip: impl Into<String>,
        status_code: i64,
        duration_ms: f64,
        metadata: Metadata,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            level: classify_status(status_code),
            service: service.into(),
            method: method.into(),
            path: path.into(),
            status_code,
            duration_ms,
            user_agent: None,
            client_ip: client_ip.into(),
            metadata,
        }
    }

    /// Attach the requesting user agent. An empty string leaves it unset.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = non_empty(Some(user_agent.into()));
        self
    }
}

/// A single metric data point. Always informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricLog {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub service: String,
    pub metric_name: String,
    pub value: f64,
    pub unit: String,
    #[serde(default)]
    pub tags: HashMap<String, String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl MetricLog {
    pub fn new(
        service: impl Into<String>,
        metric_name: impl Into<String>,
        unit: impl Into<String>,
        value: f64,
        tags: HashMap<String, String>,
        metadata: Metadata,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            level: Level::Info,
            service: service.into(),
            metric_name: metric_name.into(),
            value,
            unit: unit.into(),
            tags,
            metadata,
        }
    }
}

/// An error report with optional error code and stack trace. Always `ERROR`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLog {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub service: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub stacktrace: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub error_code: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl ErrorLog {
    pub fn new(
        service: impl Into<String>,
        message: impl Into<String>,
        error_code: Option<String>,
        stacktrace: Option<String>,
        metadata: Metadata,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            level: Level::Error,
            service: service.into(),
            message: message.into(),
            stacktrace: non_empty(stacktrace),
            error_code: non_empty(error_code),
            metadata,
        }
    }
}

/// Optional text fields are left out of the JSON when absent or empty.
fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Discriminant of a [`Record`], used for log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Message,
    Access,
    Metric,
    Error,
}

impl RecordKind {
    pub fn name(&self) -> &'static str {
        match self {
            RecordKind::Message => "message",
            RecordKind::Access => "access",
            RecordKind::Metric => "metric",
            RecordKind::Error => "error",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Any one of the record kinds produced by the traffic generator.
///
/// Serializes as the inner record with no tag, so the collector sees exactly
/// the same JSON object as when sending the concrete type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    Message(LogMessage),
    Access(AccessLog),
    Metric(MetricLog),
    Error(ErrorLog),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Message(_) => RecordKind::Message,
            Record::Access(_) => RecordKind::Access,
            Record::Metric(_) => RecordKind::Metric,
            Record::Error(_) => RecordKind::Error,
        }
    }

    pub fn level(&self) -> Level {
        match self {
            Record::Message(r) => r.level,
            Record::Access(r) => r.level,
            Record::Metric(r) => r.level,
            Record::Error(r) => r.level,
        }
    }

    pub fn service(&self) -> &str {
        match self {
            Record::Message(r) => &r.service,
            Record::Access(r) => &r.service,
            Record::Metric(r) => &r.service,
            Record::Error(r) => &r.service,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Record::Message(r) => r.timestamp,
            Record::Access(r) => r.timestamp,
            Record::Metric(r) => r.timestamp,
            Record::Error(r) => r.timestamp,
        }
    }
}

impl From<LogMessage> for Record {
    fn from(record: LogMessage) -> Self {
        Record::Message(record)
    }
}

impl From<AccessLog> for Record {
    fn from(record: AccessLog) -> Self {
        Record::Access(record)
    }
}

impl From<MetricLog> for Record {
    fn from(record: MetricLog) -> Self {
        Record::Metric(record)
    }
}

impl From<ErrorLog> for Record {
    fn from(record: ErrorLog) -> Self {
        Record::Error(record)
    }
}
