//! Memory API handlers.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    Json,
};
use serde::Deserialize;
use tracing::warn;

use memvault_protocols::{
    Memory, MemoryPatch, MemoryStats, NewMemory, RecentQuery, SearchRequest, SearchResponse,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the reconciliation warning of a partially purged delete.
pub const WARNING_HEADER: HeaderName = HeaderName::from_static("x-memvault-warning");

/// Query string of `GET /memories/search`.
///
/// `tags` is a comma-separated list; everything else mirrors
/// [`SearchRequest`].
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: String,
    pub context: Option<String>,
    pub user_id: Option<String>,
    pub conversation_id: Option<String>,
    pub tags: Option<String>,
    pub limit: Option<usize>,
    pub min_similarity: Option<f32>,
    pub include_semantic: Option<bool>,
    pub include_keyword: Option<bool>,
}

impl From<SearchParams> for SearchRequest {
    fn from(params: SearchParams) -> Self {
        let mut request = SearchRequest::new(params.query);
        request.context = params.context;
        request.user_id = params.user_id;
        request.conversation_id = params.conversation_id;
        request.tags = params
            .tags
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        if let Some(limit) = params.limit {
            request.limit = limit;
        }
        if let Some(min_similarity) = params.min_similarity {
            request.min_similarity = min_similarity;
        }
        if let Some(include_semantic) = params.include_semantic {
            request.include_semantic = include_semantic;
        }
        if let Some(include_keyword) = params.include_keyword {
            request.include_keyword = include_keyword;
        }
        request
    }
}

/// `POST /memories`
pub async fn create_memory(
    State(state): State<Arc<AppState>>,
    body: Result<Json<NewMemory>, JsonRejection>,
) -> Result<(StatusCode, Json<Memory>), ApiError> {
    let Json(new) = body?;
    let memory = state.engine.create(new).await?;
    Ok((StatusCode::CREATED, Json(memory)))
}

/// `POST /memories/batch`
pub async fn create_memories_batch(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Vec<NewMemory>>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<Memory>>), ApiError> {
    let Json(batch) = body?;
    let created = state.engine.create_batch(batch).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /memories/search`
pub async fn search_memories(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(params) = params?;
    let response = state.engine.search(params.into()).await?;
    Ok(Json(response))
}

/// `GET /memories/recent`
pub async fn recent_memories(
    State(state): State<Arc<AppState>>,
    params: Result<Query<RecentQuery>, QueryRejection>,
) -> Result<Json<Vec<Memory>>, ApiError> {
    let Query(query) = params?;
    Ok(Json(state.engine.recent(query).await?))
}

/// `GET /memories/{id}`
pub async fn get_memory(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Memory>, ApiError> {
    Ok(Json(state.engine.get(&id).await?))
}

/// `PUT /memories/{id}`
pub async fn update_memory(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<MemoryPatch>, JsonRejection>,
) -> Result<Json<Memory>, ApiError> {
    let Json(patch) = body?;
    Ok(Json(state.engine.update(&id, patch).await?))
}

/// `DELETE /memories/{id}`
///
/// Always 204 once the record is gone. A vector entry that could not be
/// removed is reported through [`WARNING_HEADER`].
pub async fn delete_memory(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, HeaderMap), ApiError> {
    let outcome = state.engine.delete(&id).await?;

    let mut headers = HeaderMap::new();
    if let Some(warning) = outcome.warning() {
        match HeaderValue::from_str(&warning) {
            Ok(value) => {
                headers.insert(WARNING_HEADER, value);
            }
            Err(_) => {
                warn!(memory_id = %id, warning = %warning, "Warning not representable as header");
                headers.insert(
                    WARNING_HEADER,
                    HeaderValue::from_static("vector entry was not removed"),
                );
            }
        }
    }
    Ok((StatusCode::NO_CONTENT, headers))
}

/// `GET /stats`
pub async fn memory_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MemoryStats>, ApiError> {
    Ok(Json(state.engine.stats().await?))
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
