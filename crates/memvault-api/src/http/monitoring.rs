//! Health check and metrics handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use memvault_core::{HealthReport, HealthStatus};

use crate::state::AppState;

/// `GET /health`
///
/// 200 while the structured store is reachable, 503 otherwise. A down vector
/// index only degrades the report.
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthReport>) {
    let report = state.engine.health().await;
    let status = match report.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
    };
    (status, Json(report))
}

/// Prometheus text exposition.
pub struct PrometheusMetrics {
    pub content: String,
}

impl IntoResponse for PrometheusMetrics {
    fn into_response(self) -> Response {
        (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            self.content,
        )
            .into_response()
    }
}

/// `GET /metrics`
///
/// Empty exposition when no recorder was installed.
pub async fn prometheus_metrics(State(state): State<Arc<AppState>>) -> PrometheusMetrics {
    let content = state.metrics().map(|handle| handle.render()).unwrap_or_default();
    PrometheusMetrics { content }
}
