//! Statistical reduction of attempt outcomes into per-address reports.

use serde::{Deserialize, Serialize};

use crate::probe::{OutcomeKind, ServerResult, truncate_latency};

/// Aggregate statistics over every attempt for one target address.
///
/// Latency aggregates cover `online` attempts only and are truncated
/// toward zero to two decimal places. When nothing was online all three
/// aggregates are zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReportStats {
    /// Fastest online round trip in milliseconds.
    pub min_latency_ms: f64,
    /// Slowest online round trip in milliseconds.
    pub max_latency_ms: f64,
    /// Mean online round trip in milliseconds.
    pub avg_latency_ms: f64,
    /// Attempts where the relay answered but the target did not.
    pub timeout_count: usize,
    /// Attempts where the target answered.
    pub online_count: usize,
    /// Attempts where the relay itself was unreachable.
    pub offline_count: usize,
    /// All attempts across all relays.
    pub total_count: usize,
}

impl ReportStats {
    /// Reduce the full result set for one address.
    ///
    /// Pure and deterministic. Input latencies are aggregated as given;
    /// only the three final aggregates are truncated.
    pub fn compute(results: &[ServerResult]) -> Self {
        let mut stats = Self::default();
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = 0.0f64;

        for server in results {
            for response in &server.responses {
                stats.total_count += 1;
                match response.kind {
                    OutcomeKind::Online => {
                        stats.online_count += 1;
                        sum += response.latency_ms;
                        min = min.min(response.latency_ms);
                        max = max.max(response.latency_ms);
                    }
                    OutcomeKind::Timeout => stats.timeout_count += 1,
                    OutcomeKind::Offline => stats.offline_count += 1,
                }
            }
        }

        if stats.online_count > 0 {
            stats.min_latency_ms = truncate_latency(min);
            stats.max_latency_ms = truncate_latency(max);
            stats.avg_latency_ms = truncate_latency(sum / stats.online_count as f64);
        }
        stats
    }
}

/// Aggregated reachability report for one target address.
///
/// Field order matches the emitted JSON key order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressReport {
    /// The probed target address.
    pub address: String,

    /// Fastest online round trip in milliseconds (0 when nothing online).
    pub min_latency_ms: f64,

    /// Slowest online round trip in milliseconds (0 when nothing online).
    pub max_latency_ms: f64,

    /// Mean online round trip in milliseconds (0 when nothing online).
    pub avg_latency_ms: f64,

    /// Attempts classified `timeout`.
    pub timeout_count: usize,

    /// Attempts classified `online`.
    pub online_count: usize,

    /// Attempts classified `offline`.
    pub offline_count: usize,

    /// All attempts (relay count times attempts per relay).
    pub total_count: usize,

    /// Per-relay results in configured relay order.
    pub servers: Vec<ServerResult>,
}

impl AddressReport {
    /// Assemble a report from reduced statistics and the raw results.
    pub fn new(address: impl Into<String>, stats: ReportStats, servers: Vec<ServerResult>) -> Self {
        Self {
            address: address.into(),
            min_latency_ms: stats.min_latency_ms,
            max_latency_ms: stats.max_latency_ms,
            avg_latency_ms: stats.avg_latency_ms,
            timeout_count: stats.timeout_count,
            online_count: stats.online_count,
            offline_count: stats.offline_count,
            total_count: stats.total_count,
            servers,
        }
    }
}
