//! Per-relay attempt loop.

use crate::config::RelayServer;
use crate::probe::client::RelayClient;
use crate::probe::outcome::ServerResult;

/// Runs the fixed attempt sequence against a single relay.
///
/// Attempts are strictly sequential within one relay, so the per-relay
/// load is one request at a time; a failing attempt yields its outcome and
/// the remaining attempts still run.
#[derive(Debug, Clone)]
pub struct ServerProber {
    client: RelayClient,
    attempts: u32,
}

impl ServerProber {
    /// Create a prober issuing `attempts` pings per relay.
    pub fn new(client: RelayClient, attempts: u32) -> Self {
        Self { client, attempts }
    }

    /// Probe one relay for one target, producing the full attempt sequence.
    pub async fn probe(&self, relay: &RelayServer, target: &str) -> ServerResult {
        let mut responses = Vec::with_capacity(self.attempts as usize);
        for attempt in 0..self.attempts {
            responses.push(self.client.ping(relay, target, attempt).await);
        }

        ServerResult {
            server_id: relay.id,
            server_address: relay.address.clone(),
            responses,
        }
    }
}
