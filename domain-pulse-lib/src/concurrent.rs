//! Isolated task fan-out for domain checking.
//!
//! Every probe and every domain runs in its own spawned task. A task that
//! errors or panics only loses its own slot: a probe slot collapses to a
//! negative vote, a domain slot collapses to an error result.

use crate::protocols::Probe;
use crate::types::{DomainResult, ProbeKind};
use futures::future::join_all;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Run one probe in its own task and collapse whatever happens into a vote.
pub(crate) async fn settle_probe(kind: ProbeKind, probe: Arc<dyn Probe>, hostname: String) -> bool {
    let task_hostname = hostname.clone();
    let handle = tokio::spawn(async move { probe.probe(&task_hostname).await });

    match handle.await {
        Ok(Ok(outcome)) => kind.settle(&outcome),
        Ok(Err(e)) => {
            tracing::warn!(%hostname, probe = %kind, error = %e, "Probe failed internally, counting as taken");
            false
        }
        Err(e) => {
            tracing::warn!(%hostname, probe = %kind, error = %e, "Probe task aborted, counting as taken");
            false
        }
    }
}

/// Await per-domain tasks and return their results in spawn order.
///
/// A task that did not complete yields [`DomainResult::failed`] for its
/// hostname; its siblings are unaffected.
pub(crate) async fn collect_in_order(
    tasks: Vec<(String, JoinHandle<DomainResult>)>,
) -> Vec<DomainResult> {
    let (hostnames, handles): (Vec<String>, Vec<JoinHandle<DomainResult>>) =
        tasks.into_iter().unzip();

    join_all(handles)
        .await
        .into_iter()
        .zip(hostnames)
        .map(|(joined, hostname)| match joined {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(%hostname, error = %e, "Domain evaluation failed");
                DomainResult::failed(hostname)
            }
        })
        .collect()
}
