//! Core data types for domain availability checking.
//!
//! This module defines the per-probe outcome model, the voting rule, the
//! per-domain result record and the probe configuration.

use serde::Serialize;
use std::time::Duration;

/// Error text attached to a result whose whole evaluation failed.
pub const CHECK_FAILED_MESSAGE: &str = "Unable to check domain availability";

/// Well-known WHOIS endpoint used for the reachability probe.
pub const WHOIS_SERVER: &str = "whois.iana.org";

/// WHOIS service port.
pub const WHOIS_PORT: u16 = 43;

/// Which of the three signals a probe produces.
///
/// Each kind carries its own policy for collapsing a [`ProbeOutcome`] into a
/// single "looks available" vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeKind {
    /// DNS A/AAAA resolution of the hostname
    Dns,
    /// TCP reachability of the fixed WHOIS endpoint
    Whois,
    /// HTTPS GET `/` on the hostname
    Http,
}

impl ProbeKind {
    /// All probe kinds in voting order.
    pub const ALL: [ProbeKind; 3] = [ProbeKind::Dns, ProbeKind::Whois, ProbeKind::Http];

    /// Collapse a probe outcome into this probe's vote.
    ///
    /// | kind  | resolved | timed out | failed |
    /// |-------|----------|-----------|--------|
    /// | dns   | value    | false     | false  |
    /// | whois | value    | false     | true   |
    /// | http  | value    | true      | true   |
    pub fn settle(self, outcome: &ProbeOutcome) -> bool {
        match (self, outcome) {
            (_, ProbeOutcome::Resolved(available)) => *available,
            (ProbeKind::Dns, _) => false,
            (ProbeKind::Whois, ProbeOutcome::TimedOut) => false,
            (ProbeKind::Whois, ProbeOutcome::Failed(_)) => true,
            (ProbeKind::Http, ProbeOutcome::TimedOut) => true,
            (ProbeKind::Http, ProbeOutcome::Failed(_)) => true,
        }
    }
}

impl std::fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeKind::Dns => write!(f, "dns"),
            ProbeKind::Whois => write!(f, "whois"),
            ProbeKind::Http => write!(f, "http"),
        }
    }
}

/// How a single probe execution ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The probe got a definitive answer; `true` means "looks available".
    Resolved(bool),
    /// The probe hit its own timeout.
    TimedOut,
    /// The transport reported an error (refused, unreachable, TLS, ...).
    Failed(String),
}

/// The three probe votes for one hostname.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProbeMethods {
    pub dns: bool,
    pub whois: bool,
    pub http: bool,
}

impl ProbeMethods {
    /// Build from the three votes in voting order.
    pub fn new(dns: bool, whois: bool, http: bool) -> Self {
        Self { dns, whois, http }
    }

    /// The vote recorded for one probe kind.
    pub fn get(&self, kind: ProbeKind) -> bool {
        match kind {
            ProbeKind::Dns => self.dns,
            ProbeKind::Whois => self.whois,
            ProbeKind::Http => self.http,
        }
    }

    /// Number of probes voting "available".
    pub fn votes(&self) -> usize {
        [self.dns, self.whois, self.http]
            .iter()
            .filter(|vote| **vote)
            .count()
    }

    /// Majority vote: at least two of three probes say "available".
    pub fn is_majority(&self) -> bool {
        self.votes() >= 2
    }
}

/// Result of a domain availability check.
///
/// `available` is always derived from `methods`, so the record can never be
/// internally inconsistent. Fields are read through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainResult {
    domain: String,
    available: bool,
    methods: ProbeMethods,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl DomainResult {
    /// Build a result from the three probe votes.
    pub fn from_methods<D: Into<String>>(domain: D, methods: ProbeMethods) -> Self {
        Self {
            domain: domain.into(),
            available: methods.is_majority(),
            methods,
            error: None,
        }
    }

    /// Result for a domain whose evaluation could not be completed.
    pub fn failed<D: Into<String>>(domain: D) -> Self {
        Self {
            domain: domain.into(),
            available: false,
            methods: ProbeMethods::default(),
            error: Some(CHECK_FAILED_MESSAGE.to_string()),
        }
    }

    /// The canonical hostname that was checked.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Whether the majority of probes suggest the domain is unregistered.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Individual probe votes.
    pub fn methods(&self) -> ProbeMethods {
        self.methods
    }

    /// Error message when the whole evaluation failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Counts over a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub available: usize,
    pub taken: usize,
    pub errors: usize,
}

impl BatchSummary {
    /// Tally a result slice. Errored results are counted only under `errors`.
    pub fn from_results(results: &[DomainResult]) -> Self {
        results.iter().fold(
            BatchSummary {
                total: results.len(),
                ..Default::default()
            },
            |mut summary, result| {
                if result.error().is_some() {
                    summary.errors += 1;
                } else if result.is_available() {
                    summary.available += 1;
                } else {
                    summary.taken += 1;
                }
                summary
            },
        )
    }
}

/// Timeouts and endpoints used by the network probes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// TCP connect timeout for the WHOIS reachability probe
    /// Default: 2000 ms
    pub whois_timeout: Duration,

    /// Whole-request timeout for the HTTPS probe
    /// Default: 3000 ms
    pub http_timeout: Duration,

    /// Per-query DNS timeout; `None` keeps the resolver's own default
    pub dns_timeout: Option<Duration>,

    /// WHOIS endpoint host. Fixed in production; tests point it at a local socket.
    pub whois_server: String,

    /// WHOIS endpoint port
    pub whois_port: u16,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            whois_timeout: Duration::from_millis(2000),
            http_timeout: Duration::from_millis(3000),
            dns_timeout: None,
            whois_server: WHOIS_SERVER.to_string(),
            whois_port: WHOIS_PORT,
        }
    }
}

impl ProbeConfig {
    /// Set the WHOIS connect timeout.
    pub fn with_whois_timeout(mut self, timeout: Duration) -> Self {
        self.whois_timeout = timeout;
        self
    }

    /// Set the HTTPS request timeout.
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Override the resolver's DNS timeout.
    pub fn with_dns_timeout(mut self, timeout: Duration) -> Self {
        self.dns_timeout = Some(timeout);
        self
    }

    /// Point the WHOIS probe somewhere else.
    pub fn with_whois_endpoint<S: Into<String>>(mut self, server: S, port: u16) -> Self {
        self.whois_server = server.into();
        self.whois_port = port;
        self
    }
}
