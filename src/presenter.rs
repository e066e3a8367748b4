use crate::app_state::AppState;
use crate::config::PresenterConfig;
use crate::error::{Context, Result};
use crate::metrics::{metrics, RuntimeCountersSnapshot};
use crate::service::{RefreshPhase, TopologySnapshot};
use crate::topology::PositionMap;
use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;

/// HTTP boundary towards the rendering collaborator: serves the finished
/// node/edge collection and accepts position changes, resets and refresh
/// triggers. No rendering logic lives here.
pub struct PresenterServer {
    addr: SocketAddr,
}

impl PresenterServer {
    pub fn build(config: &PresenterConfig) -> Result<Self> {
        crate::ensure_err!(config.port != 0, "presenter port must be nonzero");

        let addr: SocketAddr = format!("{}:{}", config.host, config.port)
            .parse()
            .with_context(|| {
                format!(
                    "invalid presenter listen address {}:{}",
                    config.host, config.port
                )
            })?;

        Ok(Self { addr })
    }

    pub async fn serve(self, state: AppState, shutdown: CancellationToken) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .with_context(|| format!("failed to bind presenter listener on {}", self.addr))?;

        let router = Router::new()
            .route("/topology", get(topology))
            .route("/topology/refresh", post(refresh))
            .route("/topology/layout", put(update_layout).delete(reset_layout))
            .route("/live", get(live))
            .route("/metrics", get(metrics_report))
            .layer(Extension(state));

        tracing::info!("presenter server listening on {}", self.addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
            })
            .await
            .context("presenter server exited abnormally")?;

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct LayoutUpdate {
    positions: PositionMap,
}

async fn topology(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let snapshot = state.service.snapshot().await;

    (
        StatusCode::OK,
        Json(json!({
            "state": snapshot.phase.as_str(),
            "generation": snapshot.generation,
            "nodes": snapshot.graph.nodes,
            "edges": snapshot.graph.edges,
            "ts": Utc::now().to_rfc3339(),
        })),
    )
}

async fn refresh(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let generation = state.service.spawn_refresh();

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "state": RefreshPhase::Loading.as_str(),
            "generation": generation,
        })),
    )
}

async fn update_layout(
    Extension(state): Extension<AppState>,
    Json(update): Json<LayoutUpdate>,
) -> impl IntoResponse {
    state.service.update_positions(&update.positions).await;
    StatusCode::NO_CONTENT
}

async fn reset_layout(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let generation = state.service.reset_layout().await;

    (
        StatusCode::ACCEPTED,
        Json(json!({
            "generation": generation,
        })),
    )
}

async fn live(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let snapshot = state.service.snapshot().await;

    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "state": snapshot.phase.as_str(),
            "nodes_rendered": snapshot.graph.nodes.len(),
        })),
    )
}

async fn metrics_report(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let snapshot = state.service.snapshot().await;
    let counters = metrics().snapshot();
    let body = metrics_body(&snapshot, &counters);

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "text/plain; version=0.0.4")
        .body(Body::from(body))
        .expect("metrics response")
}

fn metrics_body(snapshot: &TopologySnapshot, counters: &RuntimeCountersSnapshot) -> String {
    let mut output = String::new();
    append_graph_metrics(&mut output, snapshot);
    append_refresh_metrics(&mut output, counters);
    append_upstream_metrics(&mut output, counters);
    append_layout_metrics(&mut output, counters);
    append_probe_metrics(&mut output, counters);
    output
}

fn append_graph_metrics(output: &mut String, snapshot: &TopologySnapshot) {
    output.push_str(
        "# HELP cartograph_graph_state Refresh cycle state (0=IDLE,1=LOADING,2=RENDERED)\n",
    );
    output.push_str("# TYPE cartograph_graph_state gauge\n");
    output.push_str(&format!(
        "cartograph_graph_state {}\n",
        refresh_phase_gauge(snapshot.phase)
    ));

    output.push_str("# HELP cartograph_graph_generation Generation of the published graph\n");
    output.push_str("# TYPE cartograph_graph_generation gauge\n");
    output.push_str(&format!(
        "cartograph_graph_generation {}\n",
        snapshot.generation
    ));

    output.push_str("# HELP cartograph_nodes Nodes in the published graph\n");
    output.push_str("# TYPE cartograph_nodes gauge\n");
    output.push_str(&format!("cartograph_nodes {}\n", snapshot.graph.nodes.len()));

    output.push_str("# HELP cartograph_edges Edges in the published graph\n");
    output.push_str("# TYPE cartograph_edges gauge\n");
    output.push_str(&format!("cartograph_edges {}\n", snapshot.graph.edges.len()));
}

fn append_refresh_metrics(output: &mut String, counters: &RuntimeCountersSnapshot) {
    output.push_str("# HELP cartograph_refresh_started_total Refresh cycles started\n");
    output.push_str("# TYPE cartograph_refresh_started_total counter\n");
    output.push_str(&format!(
        "cartograph_refresh_started_total {}\n",
        counters.refresh_started
    ));

    output.push_str("# HELP cartograph_refresh_completed_total Refresh cycles run to completion\n");
    output.push_str("# TYPE cartograph_refresh_completed_total counter\n");
    output.push_str(&format!(
        "cartograph_refresh_completed_total {}\n",
        counters.refresh_completed
    ));

    output.push_str(
        "# HELP cartograph_refresh_superseded_total Refresh cycles discarded because a newer one started\n",
    );
    output.push_str("# TYPE cartograph_refresh_superseded_total counter\n");
    output.push_str(&format!(
        "cartograph_refresh_superseded_total {}\n",
        counters.refresh_superseded
    ));
}

fn append_upstream_metrics(output: &mut String, counters: &RuntimeCountersSnapshot) {
    output.push_str("# HELP cartograph_route_list_failures_total Route list fetches that failed\n");
    output.push_str("# TYPE cartograph_route_list_failures_total counter\n");
    output.push_str(&format!(
        "cartograph_route_list_failures_total {}\n",
        counters.route_list_failures
    ));

    output.push_str(
        "# HELP cartograph_route_detail_skips_total Route detail fetches skipped after failure\n",
    );
    output.push_str("# TYPE cartograph_route_detail_skips_total counter\n");
    output.push_str(&format!(
        "cartograph_route_detail_skips_total {}\n",
        counters.route_detail_skips
    ));
}

fn append_layout_metrics(output: &mut String, counters: &RuntimeCountersSnapshot) {
    output.push_str("# HELP cartograph_layout_saves_total Layout snapshots persisted\n");
    output.push_str("# TYPE cartograph_layout_saves_total counter\n");
    output.push_str(&format!(
        "cartograph_layout_saves_total {}\n",
        counters.layout_saves
    ));

    output.push_str("# HELP cartograph_layout_save_failures_total Layout persist attempts that failed\n");
    output.push_str("# TYPE cartograph_layout_save_failures_total counter\n");
    output.push_str(&format!(
        "cartograph_layout_save_failures_total {}\n",
        counters.layout_save_failures
    ));

    output.push_str("# HELP cartograph_layout_resets_total Layout resets requested\n");
    output.push_str("# TYPE cartograph_layout_resets_total counter\n");
    output.push_str(&format!(
        "cartograph_layout_resets_total {}\n",
        counters.layout_resets
    ));

    output.push_str(
        "# HELP cartograph_layout_corrupt_loads_total Layout snapshots discarded as unparsable\n",
    );
    output.push_str("# TYPE cartograph_layout_corrupt_loads_total counter\n");
    output.push_str(&format!(
        "cartograph_layout_corrupt_loads_total {}\n",
        counters.layout_corrupt_loads
    ));
}

fn append_probe_metrics(output: &mut String, counters: &RuntimeCountersSnapshot) {
    if counters.probe_outcomes.is_empty() {
        return;
    }

    output.push_str("# HELP cartograph_probe_results_total Health probe outcomes by endpoint\n");
    output.push_str("# TYPE cartograph_probe_results_total counter\n");
    for entry in &counters.probe_outcomes {
        let endpoint = bounded_label(&entry.endpoint);
        output.push_str(&format!(
            "cartograph_probe_results_total{{endpoint=\"{}\",status=\"up\"}} {}\n",
            endpoint, entry.up
        ));
        output.push_str(&format!(
            "cartograph_probe_results_total{{endpoint=\"{}\",status=\"down\"}} {}\n",
            endpoint, entry.down
        ));
    }
}

fn refresh_phase_gauge(phase: RefreshPhase) -> u8 {
    match phase {
        RefreshPhase::Idle => 0,
        RefreshPhase::Loading => 1,
        RefreshPhase::Rendered => 2,
    }
}

fn bounded_label(value: &str) -> String {
    const MAX_LEN: usize = 60;
    if value.len() <= MAX_LEN {
        value.to_string()
    } else {
        value.chars().take(MAX_LEN).collect()
    }
}
