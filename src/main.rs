//! relayping Binary Entry Point
//!
//! Thin wrapper around the `relayping` library: parse flags, load the
//! relay fleet, run the probe pipeline, and print the JSON reports.

use std::time::Duration;

use clap::Parser;
use relayping::{
    config::load_servers,
    probe::{DEFAULT_ATTEMPTS, ProbeOptions, ProtocolKind},
    report::ProbeRunner,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// relayping - Relay-Driven Reachability Probe
#[derive(Parser, Debug)]
#[command(name = "relayping", version, about, long_about = None)]
struct Cli {
    /// Target addresses to test through the relay fleet
    #[arg(required = true)]
    addresses: Vec<String>,

    /// Path to the relay servers JSON file
    #[arg(
        short,
        long,
        default_value = "/usr/lib/zabbix/externalscripts/servers.json",
        env = "RELAYPING_SERVERS"
    )]
    servers: String,

    /// Per-request timeout (e.g. "6s", "1500ms")
    #[arg(long, default_value = "6s", value_parser = humantime::parse_duration)]
    timeout: Duration,

    /// Ping attempts per relay
    #[arg(long, default_value_t = DEFAULT_ATTEMPTS)]
    attempts: u32,

    /// Relay response dialect
    #[arg(long, value_enum, default_value_t = ProtocolKind::Status)]
    protocol: ProtocolKind,

    /// Emit compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Reports go to stdout; all diagnostics stay on stderr.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    tracing::info!("Loading relay servers from: {}", cli.servers);
    let servers = load_servers(&cli.servers)?;
    if servers.is_empty() {
        tracing::warn!("Relay fleet is empty, reports will carry no attempts");
    }

    tracing::info!(
        "Probing {} address(es) through {} relay(s), protocol: {}",
        cli.addresses.len(),
        servers.len(),
        cli.protocol,
    );

    let options = ProbeOptions::new()
        .with_timeout(cli.timeout)
        .with_attempts(cli.attempts)
        .with_protocol(cli.protocol);

    let runner = ProbeRunner::new(servers, &options)?;
    let reports = runner.run(&cli.addresses).await?;

    let output = if cli.compact {
        serde_json::to_string(&reports)?
    } else {
        serde_json::to_string_pretty(&reports)?
    };
    println!("{output}");

    Ok(())
}
