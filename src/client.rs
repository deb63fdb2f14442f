//! Client module for shipping records to the downstream log collector.
//!
//! Records are serialized to JSON, wrapped in an [`Envelope`] carrying the
//! send time, and handed to a [`Transport`] as a batch. The transport owns
//! framing and the connection; the collector's answer decides how many
//! envelopes were acknowledged.
//!
//! [`HttpTransport`] is the shipped implementation. It keeps one pooled
//! reqwest connection for the lifetime of the client and treats a 2xx status
//! as acknowledgment of the whole batch.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default collector address.
///
/// Port 5044 is the conventional Beats/logstash port; the collector listening
/// there must expose an HTTP ingest endpoint for [`HttpTransport`] to work.
pub const DEFAULT_ADDRESS: &str = "localhost:5044";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while talking to the collector.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The collector could not be reached at startup
    #[error("failed to connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: reqwest::Error,
    },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Collector answered with a non-success status
    #[error("collector rejected batch ({code}): {message}")]
    Status { code: u16, message: String },

    /// Record could not be rendered to JSON
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Address could not be turned into an endpoint URL
    #[error("invalid collector address '{0}'")]
    Address(String),
}

/// One batch element: a serialized record plus the time it was sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// The record rendered as JSON text
    pub message: String,

    #[serde(rename = "@timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl Envelope {
    /// Serialize `record` and wrap it with the given send time.
    pub fn wrap<R: Serialize + ?Sized>(
        record: &R,
        sent_at: DateTime<Utc>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            message: serde_json::to_string(record)?,
            timestamp: sent_at,
        })
    }
}

/// Options applied when connecting a transport.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Per-request timeout, also used for the reachability check
    pub timeout: Duration,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Network seam between the sender and the collector.
///
/// Implementations own connection lifecycle, framing and acknowledgment.
#[async_trait]
pub trait Transport: Send + Sized {
    /// Establish the connection to `address`.
    async fn connect(address: &str, options: &TransportOptions) -> Result<Self, ClientError>;

    /// Send one batch, returning how many envelopes the collector acknowledged.
    async fn send(&mut self, batch: &[Envelope]) -> Result<usize, ClientError>;

    /// Release the connection.
    async fn close(self) -> Result<(), ClientError> {
        Ok(())
    }
}

/// Transport posting envelope batches as a JSON array over HTTP.
///
/// The target must be an HTTP ingest endpoint, such as Vector's `http_server`
/// source or the logstash `http` input. A Beats/lumberjack listener does not
/// speak HTTP: the `HEAD` reachability check gets no answer and `connect`
/// fails once the configured timeout elapses.
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    url: Url,
}

impl HttpTransport {
    /// Turn `host:port` or a full URL into the ingest endpoint.
    pub fn endpoint(address: &str) -> Result<Url, ClientError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(ClientError::Address(address.to_string()));
        }

        let raw = if address.contains("://") {
            address.to_string()
        } else {
            format!("http://{}", address)
        };

        let url = Url::parse(&raw).map_err(|_| ClientError::Address(address.to_string()))?;
        if url.host_str().is_none() {
            return Err(ClientError::Address(address.to_string()));
        }
        Ok(url)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn connect(address: &str, options: &TransportOptions) -> Result<Self, ClientError> {
        let url = Self::endpoint(address)?;

        let client = Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.timeout)
            .pool_max_idle_per_host(1)
            .build()?;

        // Any HTTP answer means the collector is reachable.
        let answer = client
            .head(url.clone())
            .send()
            .await
            .map_err(|source| ClientError::Connect {
                address: address.to_string(),
                source,
            })?;

        debug!(url = %url, status = %answer.status(), "Collector reachability check answered");

        Ok(Self { client, url })
    }

    async fn send(&mut self, batch: &[Envelope]) -> Result<usize, ClientError> {
        let response = self.client.post(self.url.clone()).json(batch).send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(batch.len())
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            Err(ClientError::Status {
                code: status.as_u16(),
                message,
            })
        }
    }
}

/// Client sending records to the collector through a [`Transport`].
///
/// # Example
///
/// ```no_run
/// use lumber_sender::client::{LumberClient, TransportOptions};
/// use lumber_sender::record::{Level, LogMessage, Metadata};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let mut client: LumberClient = LumberClient::connect("localhost:5044", &TransportOptions::default())
///         .await
///         .expect("collector should be reachable");
///
///     let record = LogMessage::new(Level::Info, "demo", "hello", Metadata::new());
///     match client.send(&record).await {
///         Ok(acked) => println!("acked {}", acked),
///         Err(e) => eprintln!("send failed: {}", e),
///     }
///
///     client.close().await.ok();
/// }
/// ```
pub struct LumberClient<T: Transport = HttpTransport> {
    transport: T,
    address: String,
}

impl<T: Transport> LumberClient<T> {
    /// Connect to the collector at `address`.
    pub async fn connect(address: &str, options: &TransportOptions) -> Result<Self, ClientError> {
        let transport = T::connect(address, options).await?;
        info!(address = %address, timeout_secs = options.timeout.as_secs(), "Connected to collector");
        Ok(Self::from_transport(address, transport))
    }

    /// Wrap an already-connected transport.
    pub fn from_transport(address: impl Into<String>, transport: T) -> Self {
        Self {
            transport,
            address: address.into(),
        }
    }

    /// Send a single record, stamped with the current time.
    pub async fn send<R: Serialize + ?Sized>(&mut self, record: &R) -> Result<usize, ClientError> {
        let envelope = Envelope::wrap(record, Utc::now())?;
        self.transport.send(std::slice::from_ref(&envelope)).await
    }

    /// Send several records in one batch sharing a single send timestamp.
    ///
    /// An empty batch is acknowledged as `0` without reaching the transport.
    pub async fn send_batch<R: Serialize>(&mut self, records: &[R]) -> Result<usize, ClientError> {
        if records.is_empty() {
            return Ok(0);
        }

        let sent_at = Utc::now();
        let batch = records
            .iter()
            .map(|record| Envelope::wrap(record, sent_at))
            .collect::<Result<Vec<_>, _>>()?;

        let acked = self.transport.send(&batch).await?;
        if acked < batch.len() {
            warn!(acked = acked, batch_size = batch.len(), "Collector acknowledged a partial batch");
        }
        Ok(acked)
    }

    /// Close the underlying transport.
    pub async fn close(self) -> Result<(), ClientError> {
        debug!(address = %self.address, "Closing collector connection");
        self.transport.close().await
    }

    /// The address the client was connected to.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}
