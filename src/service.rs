use crate::health::HealthProber;
use crate::layout::LayoutStore;
use crate::metrics::metrics;
use crate::topology::{self, PositionMap, TopologyGraph};
use crate::upstream::RouteCatalogClient;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshPhase {
    Idle,
    Loading,
    Rendered,
}

impl RefreshPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            RefreshPhase::Idle => "IDLE",
            RefreshPhase::Loading => "LOADING",
            RefreshPhase::Rendered => "RENDERED",
        }
    }
}

#[derive(Clone, Debug)]
pub struct TopologySnapshot {
    pub phase: RefreshPhase,
    pub generation: u64,
    pub graph: TopologyGraph,
}

/// Owns the refresh cycle: fetch routes, rebuild the graph from scratch,
/// restore saved positions, publish, then annotate health in place.
///
/// Every cycle takes a fresh generation number; a cycle whose generation is
/// no longer the newest discards its results instead of publishing, so an
/// overlapping refresh (or a reset racing an in-flight load) cannot
/// interleave partial state.
#[derive(Clone)]
pub struct TopologyService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    catalog: RouteCatalogClient,
    prober: HealthProber,
    layout: Arc<dyn LayoutStore>,
    state: RwLock<ServiceState>,
    generation: AtomicU64,
}

struct ServiceState {
    phase: RefreshPhase,
    generation: u64,
    graph: TopologyGraph,
}

impl TopologyService {
    pub fn new(
        catalog: RouteCatalogClient,
        prober: HealthProber,
        layout: Arc<dyn LayoutStore>,
    ) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                catalog,
                prober,
                layout,
                state: RwLock::new(ServiceState {
                    phase: RefreshPhase::Idle,
                    generation: 0,
                    graph: TopologyGraph::default(),
                }),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Runs one full refresh cycle to completion and returns its generation.
    pub async fn refresh(&self) -> u64 {
        let generation = self.next_generation();
        self.run_cycle(generation).await;
        generation
    }

    /// Starts a refresh cycle in the background and returns the accepted
    /// generation immediately.
    pub fn spawn_refresh(&self) -> u64 {
        let generation = self.next_generation();
        let service = self.clone();
        tokio::spawn(async move {
            service.run_cycle(generation).await;
        });
        generation
    }

    pub async fn snapshot(&self) -> TopologySnapshot {
        let state = self.inner.state.read().await;
        TopologySnapshot {
            phase: state.phase,
            generation: state.generation,
            graph: state.graph.clone(),
        }
    }

    /// Applies user-driven position changes to the live graph and persists
    /// the resulting *full* snapshot: changed nodes take their new position,
    /// every other node keeps its last known one. Persistence failures are
    /// logged, never surfaced.
    pub async fn update_positions(&self, changes: &PositionMap) {
        let full = {
            let mut state = self.inner.state.write().await;
            state.graph.apply_positions(changes);
            state.graph.positions()
        };

        match self.inner.layout.save(&full).await {
            Ok(()) => metrics().inc_layout_save(),
            Err(err) => {
                metrics().inc_layout_save_failure();
                tracing::warn!(error = %err, "failed to persist layout snapshot");
            }
        }
    }

    /// Clears persisted positions and rebuilds; the new graph falls back to
    /// computed grid placement.
    pub async fn reset_layout(&self) -> u64 {
        if let Err(err) = self.inner.layout.clear().await {
            tracing::warn!(error = %err, "failed to clear layout snapshot");
        }
        metrics().inc_layout_reset();
        self.refresh().await
    }

    fn next_generation(&self) -> u64 {
        self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.inner.generation.load(Ordering::SeqCst) == generation
    }

    async fn run_cycle(&self, generation: u64) {
        metrics().inc_refresh_started();

        {
            let mut state = self.inner.state.write().await;
            if self.is_current(generation) {
                state.phase = RefreshPhase::Loading;
            }
        }

        let routes = self.inner.catalog.collect().await;
        let mut graph = topology::build(&routes);
        let saved = self.inner.layout.load().await;
        graph.apply_positions(&saved);

        {
            let mut state = self.inner.state.write().await;
            if !self.is_current(generation) {
                metrics().inc_refresh_superseded();
                tracing::info!(generation, "refresh superseded before publish; discarded");
                return;
            }
            state.generation = generation;
            state.phase = RefreshPhase::Rendered;
            state.graph = graph.clone();
        }

        tracing::info!(
            generation,
            routes = routes.len(),
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "topology rebuilt"
        );

        let statuses = self.inner.prober.probe_graph(&graph).await;

        {
            let mut state = self.inner.state.write().await;
            if !self.is_current(generation) {
                metrics().inc_refresh_superseded();
                tracing::info!(generation, "refresh superseded before health patch; discarded");
                return;
            }
            state.graph.apply_health(&statuses);
        }

        metrics().inc_refresh_completed();
        tracing::info!(
            generation,
            probed = statuses.len(),
            "health annotation applied"
        );
    }
}
