//! HTTP client wrapper issuing one classified ping per call.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

use crate::config::RelayServer;
use crate::probe::outcome::ProbeOutcome;
use crate::probe::protocol::{ProtocolKind, RelayProtocol, ReportedProtocol, StatusProtocol};

/// Default per-request time budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(6);

/// Default number of ping attempts per relay.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Errors that abort a probe run.
///
/// Per-attempt network failures never land here; they classify as
/// `offline` or `timeout` outcomes instead. Only local faults are errors.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// HTTP client construction failed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// A spawned probe task panicked or was cancelled.
    #[error("probe task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Tunables shared by every probe operation.
#[derive(Debug, Clone, Copy)]
pub struct ProbeOptions {
    /// Per-request time budget (default: 6s).
    pub timeout: Duration,

    /// Ping attempts per relay (default: 3).
    pub attempts: u32,

    /// Relay response dialect (default: status).
    pub protocol: ProtocolKind,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            attempts: DEFAULT_ATTEMPTS,
            protocol: ProtocolKind::default(),
        }
    }
}

impl ProbeOptions {
    /// Create options with the default timeout, attempts, and protocol.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-request time budget.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the number of ping attempts per relay.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Set the relay response dialect.
    pub fn with_protocol(mut self, protocol: ProtocolKind) -> Self {
        self.protocol = protocol;
        self
    }
}

/// Issues one reachability check through one relay per call.
///
/// Cheap to clone; clones share the underlying connection pool and
/// protocol dialect.
#[derive(Clone)]
pub struct RelayClient {
    client: Client,
    protocol: Arc<dyn RelayProtocol>,
}

impl RelayClient {
    /// Build a client honoring the configured timeout and dialect.
    ///
    /// The timeout caps the whole exchange, connect included, so a hung
    /// relay costs at most one timeout per attempt.
    ///
    /// # Errors
    /// Returns [`ProbeError::Client`] if the HTTP client cannot be built.
    pub fn new(options: &ProbeOptions) -> Result<Self, ProbeError> {
        let client = Client::builder().timeout(options.timeout).build()?;
        let protocol: Arc<dyn RelayProtocol> = match options.protocol {
            ProtocolKind::Status => Arc::new(StatusProtocol),
            ProtocolKind::Reported => Arc::new(ReportedProtocol),
        };
        Ok(Self { client, protocol })
    }

    /// Ask `relay` to ping `target` once.
    ///
    /// Always resolves to an outcome; failures classify rather than error.
    pub async fn ping(&self, relay: &RelayServer, target: &str, attempt: u32) -> ProbeOutcome {
        self.protocol.probe(&self.client, relay, target, attempt).await
    }
}

impl std::fmt::Debug for RelayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayClient").finish_non_exhaustive()
    }
}
