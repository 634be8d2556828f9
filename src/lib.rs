//! relayping - Relay-Driven Reachability Probe
//!
//! Given a fleet of relay servers and one or more target addresses, this
//! crate asks every relay to ping every target over HTTP, classifies each
//! attempt as `online`, `timeout`, or `offline`, and reduces the attempts
//! into one aggregated latency report per address. It is built to run as an
//! external check under a monitoring system: one shot, machine-readable
//! JSON on stdout, diagnostics on stderr.
//!
//! # Architecture
//!
//! - **Config**: relay fleet loading from a JSON servers file
//! - **Probe**: single-attempt HTTP exchanges and the per-relay attempt loop
//! - **Report**: statistical reduction and concurrent per-address fan-out
//!
//! # Example
//!
//! ```rust,no_run
//! use relayping::{ProbeOptions, ProbeRunner, RelayServer};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let servers = vec![
//!         RelayServer::new(1, "relay-fra.example.net:9100").with_name("fra-1"),
//!         RelayServer::new(2, "relay-ams.example.net:9100"),
//!     ];
//!
//!     let options = ProbeOptions::new().with_attempts(3);
//!     let runner = ProbeRunner::new(servers, &options)?;
//!     let reports = runner.run(&["db.example.net".to_string()]).await?;
//!
//!     println!("{}", serde_json::to_string_pretty(&reports)?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod probe;
pub mod report;

pub use config::{ConfigError, RelayServer, load_servers};
pub use probe::{
    OutcomeKind, ProbeError, ProbeOptions, ProbeOutcome, ProtocolKind, RelayClient, ServerProber,
    ServerResult,
};
pub use report::{AddressReport, AddressTester, ProbeRunner, ReportStats};
