use crate::topology::classify::EndpointKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Synthetic numeric-string identifier assigned in order of first appearance.
pub type NodeId = String;

/// Full position snapshot keyed by node id, as persisted by the layout store.
pub type PositionMap = BTreeMap<NodeId, Position>;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Unknown,
    Up,
    Down,
}

impl HealthStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthStatus::Unknown => "unknown",
            HealthStatus::Up => "up",
            HealthStatus::Down => "down",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Node {
    pub id: NodeId,
    pub raw_label: String,
    pub display_label: String,
    pub kind: EndpointKind,
    pub position: Position,
    pub font_size: u8,
    pub health: HealthStatus,
}

/// Directed connection representing one route record. The id is derived from
/// the endpoint pair, so two distinct routes between the same pair share an
/// id; edges stay a list so both still render.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Edge {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    pub label: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TopologyGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl TopologyGraph {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_by_label(&self, label: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.raw_label == label)
    }

    /// Overrides computed positions with saved ones. Ids absent from the
    /// snapshot keep their grid position; stale ids in the snapshot are
    /// ignored.
    pub fn apply_positions(&mut self, positions: &PositionMap) {
        for node in &mut self.nodes {
            if let Some(position) = positions.get(&node.id) {
                node.position = *position;
            }
        }
    }

    /// Patches probe results in place. Only `health` and `display_label`
    /// change; classification and the raw label never do.
    pub fn apply_health(&mut self, statuses: &BTreeMap<NodeId, HealthStatus>) {
        for node in &mut self.nodes {
            let Some(status) = statuses.get(&node.id) else {
                continue;
            };
            node.health = *status;
            node.display_label = match status {
                HealthStatus::Unknown => node.raw_label.clone(),
                annotated => format!("{} ({})", node.raw_label, annotated.as_str()),
            };
        }
    }

    /// Current position of every node, the whole-snapshot shape the layout
    /// store persists.
    pub fn positions(&self) -> PositionMap {
        self.nodes
            .iter()
            .map(|node| (node.id.clone(), node.position))
            .collect()
    }
}
