#[path = "common/mod.rs"]
mod common;

use cartograph::topology::{self, EndpointKind, HealthStatus, Position};
use std::collections::BTreeMap;

#[test]
fn single_route_produces_two_classified_nodes_and_one_edge() {
    let routes = vec![common::route("R1", "http-/a", "svc.topic", "core")];

    let graph = topology::build(&routes);

    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 1);

    let source = graph.node_by_label("http-/a").expect("source node");
    assert_eq!(source.id, "1");
    assert_eq!(source.kind, EndpointKind::Local);
    assert_eq!(source.health, HealthStatus::Unknown);

    let dest = graph.node_by_label("svc.topic").expect("dest node");
    assert_eq!(dest.id, "2");
    assert_eq!(dest.kind, EndpointKind::Middleware);

    let edge = &graph.edges[0];
    assert_eq!(edge.label, "R1");
    assert_eq!(edge.id, "1-2");
    assert_eq!(edge.source, "1");
    assert_eq!(edge.target, "2");
}

#[test]
fn shared_endpoint_labels_collapse_to_one_node() {
    let routes = vec![
        common::route("first", "http-/a", "shared.queue", "core"),
        common::route("second", "shared.queue", "https://sink.example.com", "core"),
        common::route("third", "http-/a", "https://sink.example.com", "core"),
    ];

    let graph = topology::build(&routes);

    // Four distinct labels, three routes.
    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(graph.edges.len(), 3);

    // Ids follow first appearance: source before dest, routes in input order.
    assert_eq!(graph.node_by_label("http-/a").expect("node").id, "1");
    assert_eq!(graph.node_by_label("shared.queue").expect("node").id, "2");
    assert_eq!(
        graph
            .node_by_label("https://sink.example.com")
            .expect("node")
            .id,
        "3"
    );
}

#[test]
fn missing_labels_coerce_to_an_empty_string_node() {
    let routes = vec![common::route("broken", "", "target.queue", "core")];

    let graph = topology::build(&routes);

    assert_eq!(graph.nodes.len(), 2);
    let empty = graph.node_by_label("").expect("empty-label node survives");
    assert_eq!(empty.kind, EndpointKind::Middleware);
    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].source, empty.id);
}

#[test]
fn duplicate_and_self_loop_routes_each_keep_an_edge() {
    let routes = vec![
        common::route("a_to_b", "a", "b", "core"),
        common::route("a_to_b_again", "a", "b", "core"),
        common::route("loop", "a", "a", "core"),
    ];

    let graph = topology::build(&routes);

    assert_eq!(graph.nodes.len(), 2);
    assert_eq!(graph.edges.len(), 3);

    // Parallel routes share an edge id; the list keeps both. Known
    // limitation, kept for fidelity.
    assert_eq!(graph.edges[0].id, graph.edges[1].id);
    assert_eq!(graph.edges[0].label, "a_to_b");
    assert_eq!(graph.edges[1].label, "a_to_b_again");

    let self_loop = &graph.edges[2];
    assert_eq!(self_loop.source, self_loop.target);
}

#[test]
fn nodes_without_saved_positions_land_on_the_grid() {
    let routes = vec![
        common::route("r1", "a", "b", "core"),
        common::route("r2", "c", "d", "core"),
    ];

    let graph = topology::build(&routes);
    assert_eq!(graph.nodes.len(), 4);

    let expect = |index: usize| Position {
        x: (index % topology::GRID_COLUMNS) as f64 * topology::GRID_CELL_WIDTH,
        y: (index / topology::GRID_COLUMNS) as f64 * topology::GRID_CELL_HEIGHT,
    };

    for (index, node) in graph.nodes.iter().enumerate() {
        assert_eq!(node.position, expect(index), "node {}", node.raw_label);
    }

    // Fourth node wraps to the second grid row.
    assert_eq!(graph.nodes[3].position.y, topology::GRID_CELL_HEIGHT);
    assert_eq!(graph.nodes[3].position.x, 0.0);
}

#[test]
fn long_labels_render_with_a_reduced_font() {
    let routes = vec![common::route(
        "r1",
        "short",
        "https://a-rather-long-endpoint-name.example.com/path",
        "core",
    )];

    let graph = topology::build(&routes);

    let short = graph.node_by_label("short").expect("short node");
    let long = graph
        .node_by_label("https://a-rather-long-endpoint-name.example.com/path")
        .expect("long node");
    assert!(long.font_size < short.font_size);
}

#[test]
fn saved_positions_override_grid_placement_for_known_ids_only() {
    let routes = vec![common::route("r1", "a", "b", "core")];
    let mut graph = topology::build(&routes);

    let mut saved = BTreeMap::new();
    saved.insert("1".to_string(), Position { x: 42.0, y: 99.0 });
    saved.insert("17".to_string(), Position { x: 1.0, y: 1.0 });

    graph.apply_positions(&saved);

    assert_eq!(graph.node("1").expect("node 1").position, Position { x: 42.0, y: 99.0 });
    // Node 2 keeps its computed position; the stale id is ignored.
    assert_eq!(
        graph.node("2").expect("node 2").position,
        Position {
            x: topology::GRID_CELL_WIDTH,
            y: 0.0
        }
    );
}

#[test]
fn health_annotation_touches_only_display_label_and_status() {
    let routes = vec![common::route(
        "r1",
        "http-/a",
        "https://svc.example.com",
        "core",
    )];
    let mut graph = topology::build(&routes);
    let external_id = graph
        .node_by_label("https://svc.example.com")
        .expect("external node")
        .id
        .clone();

    let mut statuses = BTreeMap::new();
    statuses.insert(external_id.clone(), HealthStatus::Down);
    graph.apply_health(&statuses);

    let external = graph.node(&external_id).expect("external node");
    assert_eq!(external.health, HealthStatus::Down);
    assert_eq!(external.display_label, "https://svc.example.com (down)");
    assert_eq!(external.raw_label, "https://svc.example.com");
    assert_eq!(external.kind, EndpointKind::External);

    // The local node was not in the status map and is untouched.
    let local = graph.node_by_label("http-/a").expect("local node");
    assert_eq!(local.health, HealthStatus::Unknown);
    assert_eq!(local.display_label, "http-/a");
}
