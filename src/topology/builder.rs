use crate::topology::classify::EndpointKind;
use crate::topology::model::{Edge, HealthStatus, Node, Position, TopologyGraph};
use crate::upstream::RouteRecord;
use std::collections::HashMap;

pub const GRID_COLUMNS: usize = 3;
pub const GRID_CELL_WIDTH: f64 = 260.0;
pub const GRID_CELL_HEIGHT: f64 = 140.0;

const LABEL_LENGTH_THRESHOLD: usize = 24;
const BASE_FONT_SIZE: u8 = 14;
const REDUCED_FONT_SIZE: u8 = 10;

/// Builds the deduplicated node/edge graph from an ordered route sequence.
///
/// Ids are assigned in strictly increasing order of first appearance (source
/// before dest, routes in input order), so identical input always yields an
/// identical graph. Malformed records degrade to empty-string labels rather
/// than being dropped, so they still surface as a node.
pub fn build(routes: &[RouteRecord]) -> TopologyGraph {
    let mut ids: HashMap<String, usize> = HashMap::new();
    let mut labels: Vec<String> = Vec::new();
    let mut edges = Vec::with_capacity(routes.len());

    for route in routes {
        let source = intern(&mut ids, &mut labels, &route.source);
        let target = intern(&mut ids, &mut labels, &route.dest);
        edges.push(Edge {
            id: format!("{source}-{target}"),
            source,
            target,
            label: route.name.clone(),
        });
    }

    let nodes = labels
        .into_iter()
        .enumerate()
        .map(|(index, label)| make_node(index, label))
        .collect();

    TopologyGraph { nodes, edges }
}

fn intern(ids: &mut HashMap<String, usize>, labels: &mut Vec<String>, label: &str) -> String {
    if let Some(index) = ids.get(label) {
        return node_id(*index);
    }

    let index = labels.len();
    ids.insert(label.to_string(), index);
    labels.push(label.to_string());
    node_id(index)
}

fn node_id(index: usize) -> String {
    (index + 1).to_string()
}

fn make_node(index: usize, label: String) -> Node {
    let kind = EndpointKind::classify(&label);
    let font_size = if label.chars().count() > LABEL_LENGTH_THRESHOLD {
        REDUCED_FONT_SIZE
    } else {
        BASE_FONT_SIZE
    };

    Node {
        id: node_id(index),
        display_label: label.clone(),
        raw_label: label,
        kind,
        position: grid_position(index),
        font_size,
        health: HealthStatus::Unknown,
    }
}

/// Default placement before any saved layout applies: left-to-right grid,
/// three columns wide. Exists only to avoid total overlap.
fn grid_position(index: usize) -> Position {
    let column = index % GRID_COLUMNS;
    let row = index / GRID_COLUMNS;
    Position {
        x: column as f64 * GRID_CELL_WIDTH,
        y: row as f64 * GRID_CELL_HEIGHT,
    }
}
