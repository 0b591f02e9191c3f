//! HTTP route definitions.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::http::handlers::{
    create_memories_batch, create_memory, delete_memory, get_memory, memory_stats,
    recent_memories, search_memories, update_memory,
};
use crate::http::metrics::track_metrics;
use crate::http::monitoring;
use crate::state::AppState;

/// Create the main router.
///
/// ## Route Structure
///
/// ```text
/// /api/v1
///   POST   /memories          - Create memory
///   POST   /memories/batch    - Create up to 100 memories
///   GET    /memories/search   - Hybrid search
///   GET    /memories/recent   - Newest memories
///   GET    /memories/{id}     - Read memory (counts an access)
///   PUT    /memories/{id}     - Update memory
///   DELETE /memories/{id}     - Delete memory
///   GET    /stats             - Aggregate statistics
///
/// /health                     - Store and index health
/// /metrics                    - Prometheus exposition
/// ```
///
/// Every matched route is counted and timed by [`track_metrics`].
pub fn create_router(state: Arc<AppState>) -> Router {
    let memory_routes = Router::new()
        .route("/memories", post(create_memory))
        .route("/memories/batch", post(create_memories_batch))
        .route("/memories/search", get(search_memories))
        .route("/memories/recent", get(recent_memories))
        .route(
            "/memories/{id}",
            get(get_memory).put(update_memory).delete(delete_memory),
        )
        .route("/stats", get(memory_stats))
        .with_state(state.clone());

    let monitoring_routes = Router::new()
        .route("/health", get(monitoring::health_check))
        .route("/metrics", get(monitoring::prometheus_metrics))
        .with_state(state);

    Router::new()
        .nest("/api/v1", memory_routes)
        .merge(monitoring_routes)
        .route_layer(middleware::from_fn(track_metrics))
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
