//! Driver loop: generate one record, send it, log the outcome, pause.
//!
//! Sends are strictly sequential and best-effort. A failed send is logged and
//! the loop moves on to the next record without retrying.

use std::time::Duration;

use tracing::{info, warn};

use crate::client::{LumberClient, Transport};
use crate::generator::TrafficGenerator;

/// Default number of records per run.
pub const DEFAULT_COUNT: u64 = 10;

/// Default pause between sends.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Settings for a single run of the driver loop.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Number of records to send
    pub count: u64,

    /// Pause between consecutive sends
    pub interval: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// Outcome counters of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Records built and handed to the client
    pub attempted: u64,

    /// Sends that returned an acknowledgment
    pub sent: u64,

    /// Sends that returned an error
    pub failed: u64,

    /// Total envelopes acknowledged by the collector
    pub acknowledged: u64,
}

impl RunSummary {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Send `config.count` generated records through `client`.
///
/// Sleeps `config.interval` between sends but not after the last one.
pub async fn run<T: Transport>(
    client: &mut LumberClient<T>,
    generator: &mut TrafficGenerator,
    config: &RunConfig,
) -> RunSummary {
    let mut summary = RunSummary::default();

    info!(
        count = config.count,
        interval_ms = config.interval.as_millis() as u64,
        pattern = %generator.config().pattern,
        address = %client.address(),
        "Sending records"
    );

    for index in 0..config.count {
        let record = generator.generate(index);
        let seq = index + 1;
        summary.attempted += 1;

        match client.send(&record).await {
            Ok(acked) => {
                summary.sent += 1;
                summary.acknowledged += acked as u64;
                info!(
                    seq = seq,
                    kind = %record.kind(),
                    level = %record.level(),
                    service = record.service(),
                    acked = acked,
                    "Sent record"
                );
            }
            Err(e) => {
                summary.failed += 1;
                warn!(
                    seq = seq,
                    kind = %record.kind(),
                    error = %e,
                    "Failed to send record"
                );
            }
        }

        if seq < config.count {
            tokio::time::sleep(config.interval).await;
        }
    }

    info!(
        sent = summary.sent,
        failed = summary.failed,
        acknowledged = summary.acknowledged,
        "Run complete"
    );

    summary
}
