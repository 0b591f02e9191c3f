//! Application state.

use std::sync::Arc;
use std::time::Instant;

use memvault_core::MemoryEngine;
use metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across handlers.
pub struct AppState {
    pub engine: Arc<MemoryEngine>,
    metrics: Option<PrometheusHandle>,
    start_time: Instant,
}

impl AppState {
    pub fn new(engine: Arc<MemoryEngine>) -> Self {
        Self {
            engine,
            metrics: None,
            start_time: Instant::now(),
        }
    }

    /// Serve `/metrics` from an installed Prometheus recorder.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn metrics(&self) -> Option<&PrometheusHandle> {
        self.metrics.as_ref()
    }

    /// Get uptime.
    pub fn uptime(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }
}
