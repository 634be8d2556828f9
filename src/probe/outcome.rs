//! Probe outcome data model.
//!
//! Every ping attempt resolves to exactly one [`ProbeOutcome`]; a relay's
//! full attempt sequence is collected into a [`ServerResult`].

use serde::{Deserialize, Serialize};

/// Latency value recorded when the relay itself could not be reached.
///
/// Kept negative so it can never be mistaken for a valid 0ms round trip.
pub const FAILURE_LATENCY_MS: f64 = -1.0;

/// Truncate a millisecond value toward zero to two decimal places.
///
/// Truncation, not rounding to nearest: `15.007` becomes `15.0`, never
/// `15.01`.
pub(crate) fn truncate_latency(ms: f64) -> f64 {
    (ms * 100.0).trunc() / 100.0
}

/// Classification of one ping attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    /// The relay reached the target and the target answered.
    Online,
    /// The relay was reachable but the target did not answer in time.
    Timeout,
    /// The relay itself could not be reached.
    Offline,
}

/// One classified ping attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// Zero-based attempt index within the per-relay sequence.
    pub index: u32,

    /// Outcome classification.
    #[serde(rename = "type")]
    pub kind: OutcomeKind,

    /// Round-trip time in milliseconds; [`FAILURE_LATENCY_MS`] for
    /// `offline` attempts.
    pub latency_ms: f64,

    /// Identity of the relay that produced this outcome.
    pub server_id: u32,
}

impl ProbeOutcome {
    /// The target answered through this relay.
    pub fn online(index: u32, server_id: u32, latency_ms: f64) -> Self {
        Self {
            index,
            kind: OutcomeKind::Online,
            latency_ms,
            server_id,
        }
    }

    /// The relay answered but the target did not.
    pub fn timeout(index: u32, server_id: u32, latency_ms: f64) -> Self {
        Self {
            index,
            kind: OutcomeKind::Timeout,
            latency_ms,
            server_id,
        }
    }

    /// The relay could not be reached at all.
    pub fn offline(index: u32, server_id: u32) -> Self {
        Self {
            index,
            kind: OutcomeKind::Offline,
            latency_ms: FAILURE_LATENCY_MS,
            server_id,
        }
    }
}

/// Ordered attempt outcomes for one relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerResult {
    /// Identity of the probed relay.
    pub server_id: u32,

    /// Network address of the probed relay.
    pub server_address: String,

    /// Outcomes in attempt-index order, one per configured attempt.
    pub responses: Vec<ProbeOutcome>,
}
