//! Relay server records and servers-file loading.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading the relay server list.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the servers file.
    #[error("failed to read servers file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the servers file as JSON.
    #[error("failed to parse servers JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// One relay server record.
///
/// Relays are loaded once at startup and shared read-only across all
/// concurrent probes; nothing mutates the list after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayServer {
    /// Numeric relay identity, echoed in every probe response.
    pub id: u32,
    /// Optional display name, used in log lines only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Relay network address (`host` or `host:port`).
    pub address: String,
}

impl RelayServer {
    /// Create a record directly, bypassing the servers file.
    pub fn new(id: u32, address: impl Into<String>) -> Self {
        Self {
            id,
            name: None,
            address: address.into(),
        }
    }

    /// Set the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Label for log lines: the display name when present, address otherwise.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.address)
    }
}

/// Load the relay server list from a JSON file.
///
/// The file holds a single JSON array of [`RelayServer`] records. An empty
/// array is accepted; probing an empty fleet yields reports with zeroed
/// counts.
///
/// # Errors
/// Returns [`ConfigError`] if the file cannot be read or does not parse as
/// a JSON array of records.
pub fn load_servers(path: impl AsRef<Path>) -> Result<Vec<RelayServer>, ConfigError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let servers: Vec<RelayServer> = serde_json::from_str(&content)?;
    tracing::debug!(count = servers.len(), "Loaded relay servers");
    Ok(servers)
}
