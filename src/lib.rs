//! Lumber Sender Library
//!
//! Synthetic log traffic for exercising a downstream log collector:
//!
//! - **record**: Timestamped message, access, metric and error records
//! - **generator**: Sequence generator cycling through record kinds and values
//! - **client**: Envelope serialization and the collector transport
//! - **driver**: Sequential send loop with a fixed pause between records
//! - **config**: Environment-based configuration
//!
//! # Example
//!
//! ```no_run
//! use lumber_sender::client::LumberClient;
//! use lumber_sender::config::Config;
//! use lumber_sender::driver::run;
//! use lumber_sender::generator::{GeneratorConfig, Pattern, TrafficGenerator};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let config = Config::from_env().expect("Failed to load config");
//!
//!     let mut client: LumberClient = LumberClient::connect(&config.address, &config.transport_options())
//!         .await
//!         .expect("Failed to connect");
//!
//!     let mut generator = TrafficGenerator::new(GeneratorConfig::with_pattern(Pattern::Mixed));
//!     let summary = run(&mut client, &mut generator, &config.run_config()).await;
//!     println!("sent {} of {}", summary.sent, summary.attempted);
//!
//!     client.close().await.ok();
//! }
//! ```

pub mod client;
pub mod config;
pub mod driver;
pub mod generator;
pub mod record;

pub use client::{ClientError, Envelope, HttpTransport, LumberClient, Transport, TransportOptions};
pub use config::{Config, ConfigError};
pub use driver::{run, RunConfig, RunSummary};
pub use generator::{GeneratorConfig, Pattern, TrafficGenerator};
pub use record::{
    classify_status, AccessLog, ErrorLog, Level, LogMessage, Metadata, MetricLog, Record,
    RecordKind,
};
