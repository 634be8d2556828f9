//! Probe layer: one relay, one target, classified outcomes.
//!
//! - [`RelayClient`]: issues a single classified ping through a relay
//! - [`ServerProber`]: repeats the ping a fixed number of times per relay
//! - [`RelayProtocol`]: the wire dialect spoken by the relay fleet
//! - [`ProbeOutcome`] / [`ServerResult`]: the classified attempt records

mod client;
mod outcome;
mod prober;
mod protocol;

pub use client::{DEFAULT_ATTEMPTS, DEFAULT_TIMEOUT, ProbeError, ProbeOptions, RelayClient};
pub use outcome::{FAILURE_LATENCY_MS, OutcomeKind, ProbeOutcome, ServerResult};
pub use prober::ServerProber;
pub use protocol::{ProtocolKind, RelayProtocol, ReportedProtocol, StatusProtocol};

pub(crate) use outcome::truncate_latency;
