//! Probe implementations for domain checking.
//!
//! Each probe turns one network check into a [`ProbeOutcome`]. A probe
//! returns `Err` only for internal failures (nothing about the network);
//! the checker downgrades those to a negative vote.

use crate::error::DomainCheckError;
use crate::types::ProbeOutcome;
use async_trait::async_trait;

/// DNS resolution probe
pub mod dns;

/// HTTPS reachability probe
pub mod http;

/// WHOIS endpoint reachability probe
pub mod whois;

pub use dns::DnsProbe;
pub use http::HttpProbe;
pub use whois::WhoisProbe;

/// A single network signal about a hostname.
///
/// Implementations must bound their own running time; the checker waits for
/// every probe of a domain before voting.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Run the probe against a canonical hostname.
    async fn probe(&self, hostname: &str) -> Result<ProbeOutcome, DomainCheckError>;
}
