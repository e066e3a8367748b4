use crate::service::TopologyService;

/// Shared state handed to the presenter handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: TopologyService,
}
