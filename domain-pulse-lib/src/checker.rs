//! Main domain checker implementation.
//!
//! This module provides the `DomainChecker` that fans a batch of hostnames
//! out over the DNS, WHOIS-reachability and HTTPS probes and votes on the
//! results.

use crate::concurrent::{collect_in_order, settle_probe};
use crate::error::DomainCheckError;
use crate::protocols::{DnsProbe, HttpProbe, Probe, WhoisProbe};
use crate::types::{DomainResult, ProbeConfig, ProbeKind, ProbeMethods};
use crate::utils::prepare_batch;
use std::sync::Arc;

/// Main domain checker that coordinates availability checking operations.
///
/// The checker holds no mutable state; cloning it is cheap and every call is
/// independent of every other.
///
/// # Example
///
/// ```rust,no_run
/// use domain_pulse_lib::DomainChecker;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let checker = DomainChecker::new()?;
///     let results = checker.check_raw(&["https://www.example.com/"]).await;
///     println!("{}: {}", results[0].domain(), results[0].is_available());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct DomainChecker {
    /// Configuration settings for this checker instance
    config: ProbeConfig,
    /// DNS resolution probe
    dns: Arc<dyn Probe>,
    /// WHOIS endpoint reachability probe
    whois: Arc<dyn Probe>,
    /// HTTPS reachability probe
    http: Arc<dyn Probe>,
}

impl DomainChecker {
    /// Create a new domain checker with default configuration.
    ///
    /// Default settings:
    /// - WHOIS probe timeout: 2000 ms
    /// - HTTPS probe timeout: 3000 ms
    /// - DNS timeout: resolver default
    pub fn new() -> Result<Self, DomainCheckError> {
        Self::with_config(ProbeConfig::default())
    }

    /// Create a new domain checker with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use domain_pulse_lib::{DomainChecker, ProbeConfig};
    /// use std::time::Duration;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let config = ProbeConfig::default()
    ///     .with_whois_timeout(Duration::from_millis(1500))
    ///     .with_http_timeout(Duration::from_secs(5));
    ///
    /// let checker = DomainChecker::with_config(config).unwrap();
    /// # }
    /// ```
    pub fn with_config(config: ProbeConfig) -> Result<Self, DomainCheckError> {
        let dns = DnsProbe::new(config.dns_timeout);
        let whois = WhoisProbe::with_endpoint(
            config.whois_server.clone(),
            config.whois_port,
            config.whois_timeout,
        );
        let http = HttpProbe::new(config.http_timeout)?;

        Ok(Self::with_probes(
            config,
            Arc::new(dns),
            Arc::new(whois),
            Arc::new(http),
        ))
    }

    /// Create a checker from explicit probe implementations.
    ///
    /// The slot a probe is passed in decides which vote it fills and which
    /// outcome policy applies to it.
    pub fn with_probes(
        config: ProbeConfig,
        dns: Arc<dyn Probe>,
        whois: Arc<dyn Probe>,
        http: Arc<dyn Probe>,
    ) -> Self {
        Self {
            config,
            dns,
            whois,
            http,
        }
    }

    /// Check one canonical hostname.
    ///
    /// All three probes run concurrently; the vote happens only after every
    /// one of them has settled. Probe failures never escape this call.
    pub async fn check_domain(&self, hostname: &str) -> DomainResult {
        let (dns, whois, http) = tokio::join!(
            settle_probe(ProbeKind::Dns, self.dns.clone(), hostname.to_string()),
            settle_probe(ProbeKind::Whois, self.whois.clone(), hostname.to_string()),
            settle_probe(ProbeKind::Http, self.http.clone(), hostname.to_string()),
        );

        let result = DomainResult::from_methods(hostname, ProbeMethods::new(dns, whois, http));
        tracing::debug!(
            hostname,
            dns,
            whois,
            http,
            available = result.is_available(),
            "Domain checked"
        );
        result
    }

    /// Check a batch of canonical hostnames concurrently.
    ///
    /// Returns one result per input, in input order. Duplicates are probed
    /// independently. A domain whose evaluation fails as a whole gets an
    /// error result without affecting the others.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use domain_pulse_lib::DomainChecker;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let checker = DomainChecker::new()?;
    ///     let domains = vec!["example.com".to_string(), "google.com".to_string()];
    ///     for result in checker.check_domains(&domains).await {
    ///         println!("{}: {}", result.domain(), result.is_available());
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub async fn check_domains(&self, hostnames: &[String]) -> Vec<DomainResult> {
        let tasks = hostnames
            .iter()
            .map(|hostname| {
                let checker = self.clone();
                let task_hostname = hostname.clone();
                let handle =
                    tokio::spawn(async move { checker.check_domain(&task_hostname).await });
                (hostname.clone(), handle)
            })
            .collect();

        collect_in_order(tasks).await
    }

    /// Normalize raw input lines and check the resulting batch.
    ///
    /// Blank lines are dropped before probing, so the output lines up with
    /// the non-blank inputs.
    pub async fn check_raw<S: AsRef<str>>(&self, lines: &[S]) -> Vec<DomainResult> {
        let hostnames = prepare_batch(lines);
        tracing::debug!(count = hostnames.len(), "Checking batch");
        self.check_domains(&hostnames).await
    }

    /// Get the current configuration for this checker.
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }
}
