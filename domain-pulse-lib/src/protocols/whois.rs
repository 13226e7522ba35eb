//! WHOIS reachability probe.
//!
//! This probe opens a TCP connection to one fixed WHOIS endpoint and closes
//! it again. No query is sent and nothing is parsed, so the signal is the
//! same for every hostname in a batch: it only tells whether the WHOIS
//! service itself answered.
//!
//! Vote policy:
//! - connected -> taken
//! - timed out -> taken
//! - connect error -> available

use crate::error::DomainCheckError;
use crate::protocols::Probe;
use crate::types::{ProbeOutcome, WHOIS_PORT, WHOIS_SERVER};
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;

/// TCP reachability probe against a fixed WHOIS endpoint.
#[derive(Debug, Clone)]
pub struct WhoisProbe {
    /// WHOIS server hostname
    server: String,
    /// WHOIS server port
    port: u16,
    /// Connect timeout
    timeout: Duration,
}

impl WhoisProbe {
    /// Create a probe against the well-known WHOIS endpoint.
    pub fn new(timeout: Duration) -> Self {
        Self::with_endpoint(WHOIS_SERVER, WHOIS_PORT, timeout)
    }

    /// Create a probe against a specific endpoint.
    pub fn with_endpoint<S: Into<String>>(server: S, port: u16, timeout: Duration) -> Self {
        Self {
            server: server.into(),
            port,
            timeout,
        }
    }
}

#[async_trait]
impl Probe for WhoisProbe {
    async fn probe(&self, hostname: &str) -> Result<ProbeOutcome, DomainCheckError> {
        let connect = TcpStream::connect((self.server.as_str(), self.port));

        let outcome = match tokio::time::timeout(self.timeout, connect).await {
            Ok(Ok(_stream)) => ProbeOutcome::Resolved(false),
            Ok(Err(e)) => ProbeOutcome::Failed(e.to_string()),
            Err(_) => ProbeOutcome::TimedOut,
        };

        tracing::debug!(
            hostname,
            server = %self.server,
            port = self.port,
            ?outcome,
            "WHOIS reachability probe finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProbeKind;
    use tokio::net::TcpListener;

    #[test]
    fn test_default_endpoint() {
        let probe = WhoisProbe::new(Duration::from_millis(2000));
        assert_eq!(probe.server, WHOIS_SERVER);
        assert_eq!(probe.port, 43);
        assert_eq!(probe.timeout, Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn test_reachable_endpoint_votes_taken() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let probe = WhoisProbe::with_endpoint("127.0.0.1", port, Duration::from_secs(2));
        let outcome = probe.probe("example.com").await.unwrap();

        assert_eq!(outcome, ProbeOutcome::Resolved(false));
        assert!(!ProbeKind::Whois.settle(&outcome));
    }

    #[tokio::test]
    async fn test_refused_connection_votes_available() {
        // Grab a free port, then close the listener so nothing is there
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let probe = WhoisProbe::with_endpoint("127.0.0.1", port, Duration::from_secs(2));
        let outcome = probe.probe("example.com").await.unwrap();

        assert!(matches!(outcome, ProbeOutcome::Failed(_)));
        assert!(ProbeKind::Whois.settle(&outcome));
    }

    #[tokio::test]
    async fn test_signal_does_not_depend_on_hostname() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let probe = WhoisProbe::with_endpoint("127.0.0.1", port, Duration::from_secs(2));

        let first = probe.probe("example.com").await.unwrap();
        let second = probe.probe("never-registered-0d9a.org").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_public_whois_endpoint_reachable() {
        let probe = WhoisProbe::new(Duration::from_millis(2000));
        let outcome = probe.probe("example.com").await.unwrap();
        assert_eq!(outcome, ProbeOutcome::Resolved(false));
    }
}
