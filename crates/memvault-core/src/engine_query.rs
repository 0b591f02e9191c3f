//! Memory engine: search, listings, statistics and health.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, warn};

use memvault_protocols::{
    Memory, MemoryError, MemoryStats, RecentQuery, ScanFilter, ScanOrder, ScoredMemory,
    SearchRequest, SearchResponse, SearchType, StatsQuery, VectorFilter,
};

use super::{now, MemoryEngine};
use crate::fusion::fuse;
use crate::health::{ComponentHealth, HealthReport};
use crate::validation;

/// Slack applied when admitting hits so float rounding in an index does not
/// drop exact matches. Admitted scores are reported within
/// `[min_similarity, 1.0]`.
const SCORE_TOLERANCE: f32 = 1e-5;

/// Score reported for a hit admitted at `min_similarity - SCORE_TOLERANCE`.
fn reported_score(score: f32, min_similarity: f32) -> f32 {
    score.min(1.0).max(min_similarity)
}

impl MemoryEngine {
    /// Hybrid keyword + semantic search.
    ///
    /// Keyword failures are errors; semantic failures only shrink the result.
    /// Never touches access statistics.
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse, MemoryError> {
        let started = Instant::now();
        let request = validation::validate_search(request)?;

        let filter = ScanFilter {
            text: None,
            context: request.context.clone(),
            user_id: request.user_id.clone(),
            conversation_id: request.conversation_id.clone(),
            tags: request.tags.clone(),
            vector_ids: None,
        };

        let keyword = async {
            if request.include_keyword {
                self.keyword_search(&request, &filter).await
            } else {
                Ok(Vec::new())
            }
        };
        let semantic = async {
            if request.include_semantic {
                self.semantic_search(&request, &filter).await
            } else {
                Vec::new()
            }
        };
        let (keyword, semantic) = tokio::join!(keyword, semantic);
        let keyword = keyword?;

        let requested = match (request.include_semantic, request.include_keyword) {
            (true, true) => SearchType::Hybrid,
            (true, false) => SearchType::Semantic,
            _ => SearchType::Keyword,
        };
        let fused = fuse(semantic, keyword, request.limit, requested);
        let query_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        debug!(
            results = fused.memories.len(),
            search_type = %fused.search_type,
            query_time_ms,
            "Search completed"
        );

        Ok(SearchResponse {
            total_count: fused.memories.len(),
            memories: fused.memories,
            search_type: fused.search_type,
            query_time_ms,
        })
    }

    async fn keyword_search(
        &self,
        request: &SearchRequest,
        filter: &ScanFilter,
    ) -> Result<Vec<Memory>, MemoryError> {
        let filter = ScanFilter {
            text: Some(request.query.clone()),
            ..filter.clone()
        };
        self.with_store(self.store.scan(&filter, ScanOrder::Importance, request.limit))
            .await
    }

    async fn semantic_search(&self, request: &SearchRequest, filter: &ScanFilter) -> Vec<ScoredMemory> {
        let embedding = match self.embed(&request.query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!(error = %e, "Query embedding failed, skipping semantic results");
                return Vec::new();
            }
        };

        let index_filter = VectorFilter {
            user_id: request.user_id.clone(),
            conversation_id: request.conversation_id.clone(),
        };
        let threshold = request.min_similarity - SCORE_TOLERANCE;
        let hits = match self
            .with_index(self.index.query(&embedding, request.limit, threshold, &index_filter))
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "Vector query failed, skipping semantic results");
                return Vec::new();
            }
        };
        if hits.is_empty() {
            return Vec::new();
        }

        let scores: HashMap<String, f32> = hits
            .into_iter()
            .filter(|hit| hit.score >= threshold)
            .map(|hit| (hit.vector_id, reported_score(hit.score, request.min_similarity)))
            .collect();

        // Resolve through the structured store: orphaned entries and records
        // failing the metadata filters drop out here.
        let resolve = ScanFilter {
            vector_ids: Some(scores.keys().cloned().collect()),
            ..filter.clone()
        };
        let records = match self
            .with_store(self.store.scan(&resolve, ScanOrder::Importance, scores.len()))
            .await
        {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Resolving vector hits failed, skipping semantic results");
                return Vec::new();
            }
        };

        records
            .into_iter()
            .filter_map(|memory| {
                let score = *scores.get(memory.vector_id.as_deref()?)?;
                Some(ScoredMemory {
                    memory,
                    similarity_score: Some(score),
                })
            })
            .collect()
    }

    /// Most recent memories first.
    pub async fn recent(&self, query: RecentQuery) -> Result<Vec<Memory>, MemoryError> {
        validation::validate_recent(&query)?;
        let filter = ScanFilter {
            user_id: query.user_id,
            context: query.context,
            ..Default::default()
        };
        self.with_store(self.store.scan(&filter, ScanOrder::Newest, query.limit))
            .await
    }

    /// Aggregate statistics from the structured store.
    pub async fn stats(&self) -> Result<MemoryStats, MemoryError> {
        let query = StatsQuery {
            top_tags: self.config.stats_top_tags,
            window_days: self.config.stats_window_days,
            now: now(),
        };
        self.with_store(self.store.aggregate(&query)).await
    }

    /// Probe both stores.
    pub async fn health(&self) -> HealthReport {
        let (store, index) = tokio::join!(
            self.with_store(self.store.ping()),
            self.with_index(self.index.ping())
        );

        let store = match store {
            Ok(()) => ComponentHealth::healthy(),
            Err(e) => ComponentHealth::unhealthy(e.to_string()),
        };
        let index = match index {
            Ok(()) => ComponentHealth::healthy(),
            Err(e) => ComponentHealth::unhealthy(e.to_string()),
        };
        HealthReport::from_components(store, index)
    }
}
