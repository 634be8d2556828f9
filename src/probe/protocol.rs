//! Relay wire-protocol dialects.
//!
//! Every relay exposes the same ping endpoint, HTTP GET
//! `/PING/<target>?trID=<attempt>&nPing=1`, but two response shapes exist
//! in deployed fleets:
//!
//! - [`StatusProtocol`]: the status code carries the verdict (200 means the
//!   target answered, anything else means it timed out) and the round-trip
//!   time is measured locally around the exchange.
//! - [`ReportedProtocol`]: the relay answers 200 with a JSON body
//!   `{"ms": <rtt>, "err": {...}?}` carrying both verdict and round-trip
//!   time as measured by the relay itself.

use std::time::Instant;

use async_trait::async_trait;
use clap::ValueEnum;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::RelayServer;
use crate::probe::outcome::{ProbeOutcome, truncate_latency};

/// Which response shape the relay fleet speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ProtocolKind {
    /// Verdict from the HTTP status code, latency measured locally.
    #[default]
    Status,
    /// Verdict and latency from the JSON response body.
    Reported,
}

impl ProtocolKind {
    /// Stable name used in logs and flag values.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Reported => "reported",
        }
    }
}

impl std::fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ping exchange with a relay, classified.
///
/// Implementations are infallible: every network or protocol failure maps
/// to an `offline` or `timeout` outcome rather than an error, so one bad
/// relay can never abort the attempts of its siblings.
#[async_trait]
pub trait RelayProtocol: Send + Sync {
    /// Ask `relay` to ping `target` once and classify the result.
    async fn probe(
        &self,
        client: &Client,
        relay: &RelayServer,
        target: &str,
        attempt: u32,
    ) -> ProbeOutcome;
}

/// Build the ping URL for one attempt.
///
/// Relay addresses are used verbatim when they already carry a scheme;
/// plain `host[:port]` addresses get `http://` prepended.
fn ping_url(relay_address: &str, target: &str, attempt: u32) -> String {
    if relay_address.contains("://") {
        format!("{relay_address}/PING/{target}?trID={attempt}&nPing=1")
    } else {
        format!("http://{relay_address}/PING/{target}?trID={attempt}&nPing=1")
    }
}

// =============================================================================
// Status-code dialect
// =============================================================================

/// Relay dialect that answers with a bare status code.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusProtocol;

#[async_trait]
impl RelayProtocol for StatusProtocol {
    async fn probe(
        &self,
        client: &Client,
        relay: &RelayServer,
        target: &str,
        attempt: u32,
    ) -> ProbeOutcome {
        let url = ping_url(&relay.address, target, attempt);
        let start = Instant::now();
        let result = client.get(&url).send().await;
        let latency_ms = truncate_latency(start.elapsed().as_secs_f64() * 1000.0);

        match result {
            Ok(response) if response.status() == StatusCode::OK => {
                tracing::debug!(
                    relay = %relay.label(),
                    address = target,
                    attempt,
                    latency_ms,
                    "Target answered"
                );
                ProbeOutcome::online(attempt, relay.id, latency_ms)
            }
            Ok(response) => {
                tracing::debug!(
                    relay = %relay.label(),
                    address = target,
                    attempt,
                    status = response.status().as_u16(),
                    "Target did not answer"
                );
                ProbeOutcome::timeout(attempt, relay.id, latency_ms)
            }
            Err(error) => {
                tracing::warn!(
                    relay = %relay.label(),
                    address = target,
                    attempt,
                    error = %error,
                    "Relay unreachable"
                );
                ProbeOutcome::offline(attempt, relay.id)
            }
        }
    }
}

// =============================================================================
// Reported (JSON body) dialect
// =============================================================================

/// Body shape returned by `reported`-dialect relays.
#[derive(Debug, Deserialize)]
struct PingReply {
    /// Relay-measured round-trip time in whole milliseconds.
    ms: i64,

    /// Present when the target did not answer.
    #[serde(default)]
    err: Option<ReplyError>,
}

/// Error detail attached to a failed ping.
#[derive(Debug, Deserialize)]
struct ReplyError {
    message: String,
    name: String,
}

/// Relay dialect that reports verdict and latency in a JSON body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportedProtocol;

impl ReportedProtocol {
    fn classify(reply: PingReply, relay: &RelayServer, target: &str, attempt: u32) -> ProbeOutcome {
        let latency_ms = reply.ms as f64;
        match reply.err {
            Some(err) => {
                tracing::debug!(
                    relay = %relay.label(),
                    address = target,
                    attempt,
                    error_name = %err.name,
                    error = %err.message,
                    "Target did not answer"
                );
                ProbeOutcome::timeout(attempt, relay.id, latency_ms)
            }
            None => {
                tracing::debug!(
                    relay = %relay.label(),
                    address = target,
                    attempt,
                    latency_ms,
                    "Target answered"
                );
                ProbeOutcome::online(attempt, relay.id, latency_ms)
            }
        }
    }
}

#[async_trait]
impl RelayProtocol for ReportedProtocol {
    async fn probe(
        &self,
        client: &Client,
        relay: &RelayServer,
        target: &str,
        attempt: u32,
    ) -> ProbeOutcome {
        let url = ping_url(&relay.address, target, attempt);
        let response = match client.get(&url).send().await {
            Ok(response) if response.status() == StatusCode::OK => response,
            Ok(response) => {
                tracing::warn!(
                    relay = %relay.label(),
                    address = target,
                    attempt,
                    status = response.status().as_u16(),
                    "Unexpected relay status"
                );
                return ProbeOutcome::offline(attempt, relay.id);
            }
            Err(error) => {
                tracing::warn!(
                    relay = %relay.label(),
                    address = target,
                    attempt,
                    error = %error,
                    "Relay unreachable"
                );
                return ProbeOutcome::offline(attempt, relay.id);
            }
        };

        match response.json::<PingReply>().await {
            Ok(reply) => Self::classify(reply, relay, target, attempt),
            Err(error) => {
                tracing::warn!(
                    relay = %relay.label(),
                    address = target,
                    attempt,
                    error = %error,
                    "Malformed relay reply"
                );
                ProbeOutcome::offline(attempt, relay.id)
            }
        }
    }
}
