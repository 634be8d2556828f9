//! Configuration module for the relayping probe.
//!
//! Provides loading of the relay server list consumed by every probe run:
//! - [`RelayServer`]: one relay record (id, address, optional name)
//! - [`load_servers`]: reads a JSON array of records from disk
//! - [`ConfigError`]: typed failures for unreadable or malformed files

mod servers;

pub use servers::{ConfigError, RelayServer, load_servers};
