//! DNS probe.
//!
//! A hostname that resolves is in use. Only an NXDOMAIN answer counts as a
//! signal of availability; every other failure is inconclusive and votes
//! "taken".

use crate::error::DomainCheckError;
use crate::protocols::Probe;
use crate::types::ProbeOutcome;
use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::TokioAsyncResolver;
use std::time::Duration;

/// DNS A/AAAA resolution probe.
#[derive(Clone)]
pub struct DnsProbe {
    resolver: TokioAsyncResolver,
}

impl DnsProbe {
    /// Build a probe from the system resolver configuration.
    ///
    /// Falls back to the resolver's built-in upstreams when the system
    /// configuration cannot be read. `timeout` overrides the per-query timeout.
    pub fn new(timeout: Option<Duration>) -> Self {
        let (config, opts) = match hickory_resolver::system_conf::read_system_conf() {
            Ok(system) => system,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read system DNS configuration, using defaults");
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };

        Self::with_resolver_config(config, opts, timeout)
    }

    /// Build a probe against explicit upstreams.
    ///
    /// The answer cache is always disabled: every probe queries upstream.
    pub fn with_resolver_config(
        config: ResolverConfig,
        mut opts: ResolverOpts,
        timeout: Option<Duration>,
    ) -> Self {
        if let Some(timeout) = timeout {
            opts.timeout = timeout;
        }
        opts.cache_size = 0;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl Probe for DnsProbe {
    async fn probe(&self, hostname: &str) -> Result<ProbeOutcome, DomainCheckError> {
        match self.resolver.lookup_ip(hostname).await {
            Ok(lookup) => {
                tracing::debug!(
                    hostname,
                    addresses = lookup.iter().count(),
                    "DNS lookup resolved"
                );
                Ok(ProbeOutcome::Resolved(false))
            }
            Err(e) => {
                let outcome = settle_lookup_error(&e);
                tracing::debug!(hostname, error = %e, ?outcome, "DNS lookup failed");
                Ok(outcome)
            }
        }
    }
}

/// Classify a resolver error.
fn settle_lookup_error(err: &ResolveError) -> ProbeOutcome {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            outcome_for_response_code(*response_code, err.to_string())
        }
        ResolveErrorKind::Timeout => ProbeOutcome::TimedOut,
        _ => ProbeOutcome::Failed(err.to_string()),
    }
}

/// NXDOMAIN means the name does not exist. Any other code with no records
/// (e.g. NOERROR for a name without addresses, SERVFAIL) is inconclusive.
fn outcome_for_response_code(code: ResponseCode, reason: String) -> ProbeOutcome {
    if code == ResponseCode::NXDomain {
        ProbeOutcome::Resolved(true)
    } else {
        ProbeOutcome::Failed(reason)
    }
}
