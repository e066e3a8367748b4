#[path = "common/mod.rs"]
mod common;

use cartograph::health::HealthProber;
use cartograph::topology::{self, EndpointKind, HealthStatus};
use httpmock::{Method, MockServer};
use std::net::TcpListener;

fn dead_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("reserve port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}/health")
}

#[tokio::test]
async fn reachable_endpoint_reports_up() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::HEAD).path("/api");
            then.status(200);
        })
        .await;

    let prober = HealthProber::new();
    let status = prober.probe(&server.url("/api")).await;
    assert_eq!(status, HealthStatus::Up);
}

#[tokio::test]
async fn error_responses_collapse_to_down() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::HEAD).path("/api");
            then.status(503);
        })
        .await;

    let prober = HealthProber::new();
    let status = prober.probe(&server.url("/api")).await;
    assert_eq!(status, HealthStatus::Down);
}

#[tokio::test]
async fn unreachable_endpoint_collapses_to_down_not_unknown() {
    let prober = HealthProber::new();
    let status = prober.probe(&dead_endpoint()).await;
    assert_eq!(status, HealthStatus::Down);
}

#[tokio::test]
async fn probe_pass_covers_external_nodes_only_and_isolates_failures() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(Method::HEAD).path("/alive");
            then.status(204);
        })
        .await;

    let alive = server.url("/alive");
    let dead = dead_endpoint();
    let routes = vec![
        common::route("r1", "http-/orders", &alive, "core"),
        common::route("r2", "orders.queue", &dead, "core"),
    ];

    let mut graph = topology::build(&routes);
    let prober = HealthProber::new();
    let statuses = prober.probe_graph(&graph).await;

    // Two external nodes probed; local and middleware nodes are omitted.
    assert_eq!(statuses.len(), 2);

    let alive_id = graph.node_by_label(&alive).expect("alive node").id.clone();
    let dead_id = graph.node_by_label(&dead).expect("dead node").id.clone();
    assert_eq!(statuses.get(&alive_id), Some(&HealthStatus::Up));
    assert_eq!(statuses.get(&dead_id), Some(&HealthStatus::Down));

    graph.apply_health(&statuses);

    let alive_node = graph.node(&alive_id).expect("alive node");
    assert_eq!(alive_node.health, HealthStatus::Up);
    assert_eq!(alive_node.display_label, format!("{alive} (up)"));
    assert_eq!(alive_node.kind, EndpointKind::External);
    assert_eq!(alive_node.raw_label, alive);

    let local = graph.node_by_label("http-/orders").expect("local node");
    assert_eq!(local.health, HealthStatus::Unknown);
    let queue = graph.node_by_label("orders.queue").expect("queue node");
    assert_eq!(queue.health, HealthStatus::Unknown);
}
