use crate::telemetry::{runtime_counters, RuntimeCounters};
use std::sync::OnceLock;

pub use crate::telemetry::{ProbeOutcomeSnapshot, RuntimeCountersSnapshot};

/// Collector that wraps the runtime counter APIs with a single entrypoint.
pub struct MetricsCollector {
    counters: &'static RuntimeCounters,
}

impl MetricsCollector {
    fn new() -> Self {
        Self {
            counters: runtime_counters(),
        }
    }

    pub fn global() -> &'static Self {
        static INSTANCE: OnceLock<MetricsCollector> = OnceLock::new();
        INSTANCE.get_or_init(Self::new)
    }

    pub fn snapshot(&self) -> RuntimeCountersSnapshot {
        self.counters.snapshot()
    }

    pub fn inc_refresh_started(&self) {
        self.counters.inc_refresh_started();
    }

    pub fn inc_refresh_completed(&self) {
        self.counters.inc_refresh_completed();
    }

    pub fn inc_refresh_superseded(&self) {
        self.counters.inc_refresh_superseded();
    }

    pub fn inc_route_list_failure(&self) {
        self.counters.inc_route_list_failure();
    }

    pub fn inc_route_detail_skip(&self) {
        self.counters.inc_route_detail_skip();
    }

    pub fn inc_layout_save(&self) {
        self.counters.inc_layout_save();
    }

    pub fn inc_layout_save_failure(&self) {
        self.counters.inc_layout_save_failure();
    }

    pub fn inc_layout_reset(&self) {
        self.counters.inc_layout_reset();
    }

    pub fn inc_layout_corrupt_load(&self) {
        self.counters.inc_layout_corrupt_load();
    }

    pub fn record_probe_outcome(&self, endpoint: &str, up: bool) {
        self.counters.record_probe_outcome(endpoint, up);
    }
}

/// Returns the shared `MetricsCollector` instance.
pub fn metrics() -> &'static MetricsCollector {
    MetricsCollector::global()
}
