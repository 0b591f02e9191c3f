//! Adapter wiring: builds the engine's store, index and embedder from config.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use memvault_config::{Config, EmbeddingProviderKind, VectorBackend};
use memvault_core::{EngineConfig, MemoryEngine};
use memvault_embedding_openai::{OpenAIEmbedding, OpenAIEmbeddingConfig};
use memvault_protocols::{EmbeddingProvider, MemoryStore, VectorIndex};
use memvault_store_sqlite::SqliteMemoryStore;
use memvault_vector_memory::{InMemoryVectorIndex, SimpleHashEmbedding};
use memvault_vector_qdrant::{QdrantConfig, QdrantIndex};

/// Map the `[engine]`, `[vector]` and `[embedding]` timeouts and limits onto
/// the engine.
pub(crate) fn engine_config(config: &Config) -> EngineConfig {
    EngineConfig {
        embedding_timeout: Duration::from_millis(config.embedding.timeout_ms),
        store_timeout: Duration::from_millis(config.engine.store_timeout_ms),
        vector_timeout: Duration::from_millis(config.vector.timeout_ms),
        max_content_length: config.engine.max_content_length,
        stats_top_tags: config.engine.stats_top_tags,
        stats_window_days: config.engine.stats_window_days,
    }
}

pub(crate) async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn MemoryStore>> {
    let store = SqliteMemoryStore::open(&config.database.path)
        .await
        .with_context(|| format!("opening database {}", config.database.path.display()))?;
    Ok(Arc::new(store))
}

pub(crate) fn build_embedder(config: &Config) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
    let settings = &config.embedding;
    match settings.provider {
        EmbeddingProviderKind::OpenAI => {
            let api_key = settings
                .api_key
                .clone()
                .context("embedding.api_key is required for the openai provider")?;
            let embedder = OpenAIEmbedding::new(
                OpenAIEmbeddingConfig::new(api_key)
                    .with_model(&settings.model)
                    .with_base_url(&settings.base_url)
                    .with_dimension(settings.dimension)
                    .with_timeout(Duration::from_millis(settings.timeout_ms)),
            )?;
            info!(model = %settings.model, dimension = settings.dimension, "Using OpenAI embeddings");
            Ok(Arc::new(embedder))
        }
        EmbeddingProviderKind::Hash => {
            info!(dimension = settings.dimension, "Using hash embeddings");
            Ok(Arc::new(SimpleHashEmbedding::new(settings.dimension)))
        }
    }
}

/// Build the vector index. Qdrant collections are created on demand with
/// the embedder's dimension; an unreachable Qdrant only logs, so the
/// service can start degraded.
pub(crate) async fn build_index(
    config: &Config,
    dimension: usize,
) -> anyhow::Result<Arc<dyn VectorIndex>> {
    let settings = &config.vector;
    match settings.backend {
        VectorBackend::Memory => {
            info!("Using in-process vector index");
            Ok(Arc::new(InMemoryVectorIndex::with_dimension(dimension)))
        }
        VectorBackend::Qdrant => {
            let mut qdrant = QdrantConfig::new(&settings.url)
                .with_collection(&settings.collection)
                .with_timeout(Duration::from_millis(settings.timeout_ms));
            if let Some(key) = &settings.api_key {
                qdrant = qdrant.with_api_key(key);
            }
            let index = QdrantIndex::new(qdrant)?;
            if let Err(e) = index.ensure_collection(dimension).await {
                warn!(url = %settings.url, error = %e, "Qdrant collection not ready, semantic search degraded");
            } else {
                info!(url = %settings.url, collection = %settings.collection, "Using Qdrant vector index");
            }
            Ok(Arc::new(index))
        }
    }
}

/// Wire every adapter into a [`MemoryEngine`].
pub(crate) async fn build_engine(config: &Config) -> anyhow::Result<MemoryEngine> {
    let store = build_store(config).await?;
    let embedder = build_embedder(config)?;
    let index = build_index(config, embedder.dimension()).await?;
    Ok(MemoryEngine::new(store, index, embedder, engine_config(config)))
}
