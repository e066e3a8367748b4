pub mod builder;
pub mod classify;
pub mod model;

pub use builder::{build, GRID_CELL_HEIGHT, GRID_CELL_WIDTH, GRID_COLUMNS};
pub use classify::{EndpointKind, LOCAL_ENDPOINT_PREFIX};
pub use model::{Edge, HealthStatus, Node, NodeId, Position, PositionMap, TopologyGraph};
