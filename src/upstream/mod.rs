pub mod client;

pub use client::{RouteCatalogClient, RouteRecord};
