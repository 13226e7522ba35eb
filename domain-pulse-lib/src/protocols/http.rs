//! HTTPS reachability probe.
//!
//! Sends `GET https://<hostname>/` and only cares whether any response
//! arrives. Status codes are not interpreted.

use crate::error::DomainCheckError;
use crate::protocols::Probe;
use crate::types::ProbeOutcome;
use async_trait::async_trait;
use std::time::Duration;

/// HTTPS GET probe.
#[derive(Clone)]
pub struct HttpProbe {
    /// HTTP client shared by every request of this probe
    http_client: reqwest::Client,
    /// Whole-request timeout
    timeout: Duration,
}

impl HttpProbe {
    /// Create a new HTTPS probe with the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, DomainCheckError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                DomainCheckError::network_with_source(
                    "Failed to create HTTPS probe client",
                    e.to_string(),
                )
            })?;

        Ok(Self {
            http_client,
            timeout,
        })
    }

    async fn request(&self, hostname: &str) -> ProbeOutcome {
        self.fetch(&format!("https://{}/", hostname)).await
    }

    /// GET `url`. Any response, whatever its status, is `Resolved(false)`.
    async fn fetch(&self, url: &str) -> ProbeOutcome {
        // The outer timeout also covers connect stalls the client may not count
        match tokio::time::timeout(self.timeout, self.http_client.get(url).send()).await {
            Ok(Ok(response)) => {
                tracing::debug!(url, status = %response.status(), "HTTPS probe got a response");
                ProbeOutcome::Resolved(false)
            }
            Ok(Err(e)) if e.is_timeout() => ProbeOutcome::TimedOut,
            Ok(Err(e)) => ProbeOutcome::Failed(e.to_string()),
            Err(_) => ProbeOutcome::TimedOut,
        }
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn probe(&self, hostname: &str) -> Result<ProbeOutcome, DomainCheckError> {
        let outcome = self.request(hostname).await;
        tracing::debug!(hostname, ?outcome, "HTTPS reachability probe finished");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProbeKind;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_client_creation() {
        let probe = HttpProbe::new(Duration::from_millis(3000));
        assert!(probe.is_ok());
    }

    #[tokio::test]
    async fn test_connection_refused_votes_available() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let probe = HttpProbe::new(Duration::from_secs(2)).unwrap();
        let outcome = probe.probe(&format!("127.0.0.1:{}", port)).await.unwrap();

        assert!(matches!(outcome, ProbeOutcome::Failed(_)));
        assert!(ProbeKind::Http.settle(&outcome));
    }

    #[tokio::test]
    async fn test_silent_server_times_out_and_votes_available() {
        // Accepts the TCP connection but never completes a TLS handshake
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let probe = HttpProbe::new(Duration::from_millis(300)).unwrap();
        let outcome = probe.probe(&format!("127.0.0.1:{}", port)).await.unwrap();

        assert_eq!(outcome, ProbeOutcome::TimedOut);
        assert!(ProbeKind::Http.settle(&outcome));
        server.abort();
    }

    /// Plain HTTP server that answers every request with `status_line`.
    async fn spawn_responder(status_line: &'static str) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                    status_line
                );
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        port
    }

    #[tokio::test]
    async fn test_any_status_code_votes_taken() {
        let probe = HttpProbe::new(Duration::from_secs(2)).unwrap();

        for status_line in ["200 OK", "404 Not Found", "500 Internal Server Error"] {
            let port = spawn_responder(status_line).await;
            let outcome = probe.fetch(&format!("http://127.0.0.1:{}/", port)).await;

            assert_eq!(outcome, ProbeOutcome::Resolved(false), "{}", status_line);
            assert!(!ProbeKind::Http.settle(&outcome), "{}", status_line);
        }
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_live_site_votes_taken() {
        let probe = HttpProbe::new(Duration::from_millis(3000)).unwrap();
        let outcome = probe.probe("example.com").await.unwrap();
        assert_eq!(outcome, ProbeOutcome::Resolved(false));
    }
}
