use crate::metrics::metrics;
use crate::topology::{HealthStatus, NodeId, TopologyGraph};
use std::collections::BTreeMap;
use tokio::task::JoinSet;

/// Best-effort liveness prober for externally addressable nodes.
///
/// The surface only needs a binary signal, so transport errors, DNS failures
/// and non-success responses all collapse to `Down`. There is no retry and no
/// per-probe budget; a new pass requires a new refresh cycle.
#[derive(Clone, Default)]
pub struct HealthProber {
    client: reqwest::Client,
}

impl HealthProber {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    pub async fn probe(&self, url: &str) -> HealthStatus {
        let status = match self.client.head(url).send().await {
            Ok(response) if response.status().is_success() => HealthStatus::Up,
            Ok(response) => {
                crate::endpoint_event!(
                    debug,
                    "cartograph::health",
                    "probe_rejected",
                    endpoint = url,
                    status = response.status().as_u16(),
                );
                HealthStatus::Down
            }
            Err(err) => {
                crate::endpoint_event!(
                    debug,
                    "cartograph::health",
                    "probe_unreachable",
                    endpoint = url,
                    error = err,
                );
                HealthStatus::Down
            }
        };

        metrics().record_probe_outcome(url, matches!(status, HealthStatus::Up));
        status
    }

    /// Probes every probe-eligible node concurrently and returns node id →
    /// status. One probe's failure never blocks or cancels its siblings;
    /// nodes outside the eligible set stay `Unknown` by omission.
    pub async fn probe_graph(&self, graph: &TopologyGraph) -> BTreeMap<NodeId, HealthStatus> {
        let mut tasks = JoinSet::new();
        for node in graph.nodes.iter().filter(|node| node.kind.probe_eligible()) {
            let prober = self.clone();
            let id = node.id.clone();
            let url = node.raw_label.clone();
            tasks.spawn(async move {
                let status = prober.probe(&url).await;
                (id, status)
            });
        }

        let mut statuses = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, status)) => {
                    statuses.insert(id, status);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "health probe task failed to join");
                }
            }
        }

        statuses
    }
}
