//! Concurrent per-relay fan-out and sequential report assembly.

use std::sync::Arc;
use std::time::Instant;

use crate::config::RelayServer;
use crate::probe::{ProbeError, ProbeOptions, RelayClient, ServerProber, ServerResult};
use crate::report::stats::{AddressReport, ReportStats};

/// Fans one address out across the whole relay fleet.
#[derive(Debug)]
pub struct AddressTester {
    servers: Arc<Vec<RelayServer>>,
    prober: ServerProber,
}

impl AddressTester {
    /// Create a tester over a fixed relay fleet.
    pub fn new(servers: Vec<RelayServer>, prober: ServerProber) -> Self {
        Self {
            servers: Arc::new(servers),
            prober,
        }
    }

    /// Probe every relay for `address` concurrently and reduce the results.
    ///
    /// One task per relay, every task awaited to completion, and results
    /// joined in configured relay order; the report layout never depends
    /// on completion order.
    ///
    /// # Errors
    /// Returns [`ProbeError::Join`] if a probe task panicked or was
    /// cancelled. Relay failures are not errors; they classify as
    /// `offline` outcomes.
    pub async fn test(&self, address: &str) -> Result<AddressReport, ProbeError> {
        let mut handles = Vec::with_capacity(self.servers.len());
        for idx in 0..self.servers.len() {
            let servers = self.servers.clone();
            let prober = self.prober.clone();
            let address = address.to_owned();
            handles.push(tokio::spawn(async move {
                prober.probe(&servers[idx], &address).await
            }));
        }

        let mut results: Vec<ServerResult> = Vec::with_capacity(handles.len());
        for handle in handles {
            results.push(handle.await?);
        }

        let stats = ReportStats::compute(&results);
        Ok(AddressReport::new(address, stats, results))
    }
}

/// Runs the requested address list end to end, one address at a time.
///
/// Addresses are sequential on purpose: peak connection fan-out stays
/// bounded by the relay count no matter how many addresses are requested.
#[derive(Debug)]
pub struct ProbeRunner {
    tester: AddressTester,
}

impl ProbeRunner {
    /// Wire the full probing pipeline from a relay fleet and options.
    ///
    /// # Errors
    /// Returns [`ProbeError::Client`] if the HTTP client cannot be built.
    pub fn new(servers: Vec<RelayServer>, options: &ProbeOptions) -> Result<Self, ProbeError> {
        let client = RelayClient::new(options)?;
        let prober = ServerProber::new(client, options.attempts);
        Ok(Self {
            tester: AddressTester::new(servers, prober),
        })
    }

    /// Produce one report per address, in request order.
    pub async fn run(&self, addresses: &[String]) -> Result<Vec<AddressReport>, ProbeError> {
        let mut reports = Vec::with_capacity(addresses.len());
        for address in addresses {
            let start = Instant::now();
            let report = self.tester.test(address).await?;
            let duration_ms = start.elapsed().as_millis().min(u32::MAX as u128) as u32;
            tracing::info!(
                address = %address,
                online = report.online_count,
                timeout = report.timeout_count,
                offline = report.offline_count,
                duration_ms,
                "Address probed"
            );
            reports.push(report);
        }
        Ok(reports)
    }
}
