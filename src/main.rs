//! Lumber Sender - synthetic log traffic for exercising a log collector
//!
//! Connects to a collector once, then sends one generated record per
//! iteration with a fixed pause in between, logging each acknowledgment or
//! failure.
//!
//! ## Configuration
//!
//! Flags override the matching environment variables:
//!
//! - `--address` / `LUMBER_SENDER_ADDRESS`: collector host:port or URL (default: localhost:5044)
//! - `--count` / `LUMBER_SENDER_COUNT`: records to send (default: 10)
//! - `--interval` / `LUMBER_SENDER_INTERVAL`: pause between sends (default: 1s)
//! - `--timeout` / `LUMBER_SENDER_TIMEOUT`: request timeout (default: 30s)
//! - `--pattern` / `LUMBER_SENDER_PATTERN`: `basic` or `mixed` (default: basic)
//! - `--seed`: seed for reproducible field values
//! - `RUST_LOG`: Logging level filter (default: info)

use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use lumber_sender::client::LumberClient;
use lumber_sender::config::{parse_duration_arg, Config, ConfigError};
use lumber_sender::driver::run;
use lumber_sender::generator::{GeneratorConfig, Pattern, TrafficGenerator};

/// Send synthetic log records to a log collector.
#[derive(Parser, Debug)]
#[command(name = "lumber-sender", version, about)]
struct Cli {
    /// Collector host:port or URL.
    #[arg(short, long, alias = "host")]
    address: Option<String>,

    /// Number of records to send.
    #[arg(short = 'n', long)]
    count: Option<u64>,

    /// Pause between sends, e.g. `500ms`, `1s`.
    #[arg(short, long, value_parser = parse_duration_arg)]
    interval: Option<Duration>,

    /// Request timeout.
    #[arg(long, value_parser = parse_duration_arg)]
    timeout: Option<Duration>,

    /// Record kinds to generate: `basic` or `mixed`.
    #[arg(short, long)]
    pattern: Option<Pattern>,

    /// Seed for reproducible field values.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    let cli = Cli::parse();

    let config = match load_config(cli) {
        Ok(config) => {
            info!(
                address = %config.address,
                count = config.count,
                interval_ms = config.interval.as_millis() as u64,
                pattern = %config.pattern,
                "Configuration loaded"
            );
            config
        }
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    let mut client: LumberClient = match LumberClient::connect(
        &config.address,
        &config.transport_options(),
    )
    .await
    {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, address = %config.address, "Failed to connect to collector");
            std::process::exit(1);
        }
    };

    let generator_config = GeneratorConfig::with_pattern(config.pattern);
    let mut generator = match config.seed {
        Some(seed) => TrafficGenerator::with_seed(generator_config, seed),
        None => TrafficGenerator::new(generator_config),
    };

    let run_config = config.run_config();
    let summary = tokio::select! {
        summary = run(&mut client, &mut generator, &run_config) => Some(summary),
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, stopping...");
            None
        }
    };

    if let Err(e) = client.close().await {
        warn!(error = %e, "Failed to close collector connection");
    }

    match summary {
        Some(summary) if summary.is_clean() => {
            info!(sent = summary.sent, "All records sent successfully");
        }
        Some(summary) => {
            warn!(
                sent = summary.sent,
                failed = summary.failed,
                "Finished with send failures"
            );
        }
        None => info!("Sender stopped before completing the run"),
    }
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

/// Environment first, then command-line flags on top.
fn load_config(cli: Cli) -> Result<Config, ConfigError> {
    let mut config = Config::load_env()?;
    apply_overrides(&mut config, cli);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(config: &mut Config, cli: Cli) {
    if let Some(address) = cli.address {
        config.address = address;
    }
    if let Some(count) = cli.count {
        config.count = count;
    }
    if let Some(interval) = cli.interval {
        config.interval = interval;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout = timeout;
    }
    if let Some(pattern) = cli.pattern {
        config.pattern = pattern;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use lumber_sender::config::ENV_COUNT;
    use std::env;

    struct EnvGuard {
        key: &'static str,
        original: Option<String>,
    }

    impl EnvGuard {
        fn set(key: &'static str, value: &str) -> Self {
            let original = env::var(key).ok();
            env::set_var(key, value);
            Self { key, original }
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            match &self.original {
                Some(val) => env::set_var(self.key, val),
                None => env::remove_var(self.key),
            }
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "lumber-sender",
            "--host",
            "collector:5044",
            "-n",
            "3",
            "--interval",
            "250ms",
            "--pattern",
            "mixed",
            "--seed",
            "42",
        ])
        .unwrap();

        assert_eq!(cli.address.as_deref(), Some("collector:5044"));
        assert_eq!(cli.count, Some(3));
        assert_eq!(cli.interval, Some(Duration::from_millis(250)));
        assert_eq!(cli.pattern, Some(Pattern::Mixed));
        assert_eq!(cli.seed, Some(42));
        assert!(cli.timeout.is_none());
    }

    #[test]
    fn test_cli_rejects_bad_interval() {
        assert!(Cli::try_parse_from(["lumber-sender", "--interval", "soon"]).is_err());
    }

    #[test]
    fn test_overrides_replace_only_given_values() {
        let mut config = Config::default();
        let cli = Cli::try_parse_from(["lumber-sender", "--count", "2"]).unwrap();

        apply_overrides(&mut config, cli);

        assert_eq!(config.count, 2);
        assert_eq!(config.address, "localhost:5044");
        assert_eq!(config.interval, Duration::from_secs(1));
        assert_eq!(config.pattern, Pattern::Basic);
    }

    #[test]
    fn test_flag_replaces_out_of_range_env_value() {
        let _guard = EnvGuard::set(ENV_COUNT, "5000000");

        let cli = Cli::try_parse_from(["lumber-sender", "--count", "3"]).unwrap();
        let config = load_config(cli).expect("flag should win over the environment");
        assert_eq!(config.count, 3);

        let cli = Cli::try_parse_from(["lumber-sender"]).unwrap();
        let err = load_config(cli).unwrap_err();
        assert!(err.message.contains("exceeds maximum"));
    }
}
