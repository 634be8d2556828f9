//! Report layer: reduction and assembly of per-address reports.
//!
//! - [`ReportStats`]: pure statistical reduction over all attempts
//! - [`AddressTester`]: concurrent per-relay fan-out for one address
//! - [`ProbeRunner`]: sequential assembly across every requested address

mod runner;
mod stats;

pub use runner::{AddressTester, ProbeRunner};
pub use stats::{AddressReport, ReportStats};
