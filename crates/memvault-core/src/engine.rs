//! Memory engine: writes, reads by id and deletes.

use std::future::Future;
use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use memvault_protocols::{
    DeleteOutcome, Embedding, EmbeddingError, EmbeddingProvider, Memory, MemoryError, MemoryPatch,
    MemoryStore, NewMemory, StoreError, Timestamp, VectorError, VectorIndex, VectorPayload,
    DEFAULT_IMPORTANCE,
};

use crate::config::{EngineConfig, MAX_BATCH_SIZE};
use crate::validation;

#[path = "engine_query.rs"]
mod engine_query;

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

/// Coordinates the structured store, the vector index and the embedder.
pub struct MemoryEngine {
    store: Arc<dyn MemoryStore>,
    index: Arc<dyn VectorIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    config: EngineConfig,
}

impl MemoryEngine {
    pub fn new(
        store: Arc<dyn MemoryStore>,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            index,
            embedder,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create a memory.
    ///
    /// Embedding or vector-index failures do not fail the call: the record is
    /// returned with `vector_id == None` and stays keyword-searchable.
    pub async fn create(&self, new: NewMemory) -> Result<Memory, MemoryError> {
        let new = validation::validate_new(new, self.config.max_content_length)?;
        let now = now();
        let mut memory = Memory {
            id: Uuid::new_v4().to_string(),
            content: new.content,
            context: new.context,
            tags: new.tags,
            user_id: new.user_id,
            conversation_id: new.conversation_id,
            importance_score: new.importance_score.unwrap_or(DEFAULT_IMPORTANCE),
            metadata: new.metadata,
            access_count: 0,
            last_accessed: None,
            created_at: now,
            updated_at: now,
            vector_id: None,
        };

        let embedding = self.embed_best_effort(&memory.id, &memory.content).await;

        self.with_store(self.store.insert(&memory)).await?;
        info!(memory_id = %memory.id, "Created memory");

        if let Some(embedding) = embedding {
            memory.vector_id = self.attach_vector(&memory, &embedding).await;
        }
        Ok(memory)
    }

    /// Create up to [`MAX_BATCH_SIZE`] memories in order.
    ///
    /// A failing item is logged and skipped; the others are still created.
    pub async fn create_batch(&self, batch: Vec<NewMemory>) -> Result<Vec<Memory>, MemoryError> {
        if batch.len() > MAX_BATCH_SIZE {
            return Err(MemoryError::validation(format!(
                "batch of {} exceeds maximum of {}",
                batch.len(),
                MAX_BATCH_SIZE
            )));
        }

        let total = batch.len();
        let mut created = Vec::with_capacity(total);
        for (position, new) in batch.into_iter().enumerate() {
            match self.create(new).await {
                Ok(memory) => created.push(memory),
                Err(e) => warn!(position, error = %e, "Skipping batch item"),
            }
        }
        info!(created = created.len(), total, "Batch create finished");
        Ok(created)
    }

    /// Read by id, bumping `access_count` and `last_accessed`.
    pub async fn get(&self, id: &str) -> Result<Memory, MemoryError> {
        self.with_store(self.store.record_access(id, now()))
            .await?
            .ok_or_else(|| MemoryError::NotFound(id.to_string()))
    }

    /// Apply a partial update.
    ///
    /// When the content changes the old vector entry is replaced under a new
    /// key; if re-embedding fails the record becomes keyword-only.
    pub async fn update(&self, id: &str, patch: MemoryPatch) -> Result<Memory, MemoryError> {
        let mut patch = validation::validate_patch(patch, self.config.max_content_length)?;

        let current = self
            .with_store(self.store.get(id))
            .await?
            .ok_or_else(|| MemoryError::NotFound(id.to_string()))?;

        if patch.content.as_ref() == Some(&current.content) {
            patch.content = None;
        }
        let embedding = match &patch.content {
            Some(content) => self.embed_best_effort(id, content).await,
            None => None,
        };

        let mut updated = self
            .with_store(self.store.update(id, &patch, now()))
            .await?
            .ok_or_else(|| MemoryError::NotFound(id.to_string()))?;
        debug!(memory_id = %id, content_changed = patch.content.is_some(), "Updated memory");

        if patch.content.is_some() {
            if let Some(old) = &current.vector_id {
                if let Err(e) = self.with_index(self.index.delete(old)).await {
                    warn!(
                        memory_id = %id,
                        vector_id = %old,
                        error = %e,
                        "Stale vector entry left behind, needs reconciliation"
                    );
                }
            }
            if let Some(embedding) = embedding {
                updated.vector_id = self.attach_vector(&updated, &embedding).await;
            }
        }
        Ok(updated)
    }

    /// Delete a memory from both stores.
    pub async fn delete(&self, id: &str) -> Result<DeleteOutcome, MemoryError> {
        let removed = self
            .with_store(self.store.delete(id))
            .await?
            .ok_or_else(|| MemoryError::NotFound(id.to_string()))?;
        info!(memory_id = %id, "Deleted memory");

        let Some(vector_id) = removed.vector_id else {
            return Ok(DeleteOutcome::KeywordOnly);
        };

        match self.with_index(self.index.delete(&vector_id)).await {
            Ok(()) => Ok(DeleteOutcome::Purged),
            Err(e) => {
                warn!(
                    memory_id = %id,
                    vector_id = %vector_id,
                    error = %e,
                    "Vector entry orphaned, needs reconciliation"
                );
                Ok(DeleteOutcome::VectorOrphaned {
                    vector_id,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Upsert the vector entry for `memory` and record its key. Returns the
    /// key on success; any failure leaves the record keyword-only.
    async fn attach_vector(&self, memory: &Memory, embedding: &Embedding) -> Option<String> {
        let vector_id = vector_key(&memory.id, &memory.content);
        let payload = VectorPayload {
            memory_id: memory.id.clone(),
            user_id: memory.user_id.clone(),
            conversation_id: memory.conversation_id.clone(),
            context: memory.context.clone(),
        };

        if let Err(e) = self
            .with_index(self.index.upsert(&vector_id, embedding, &payload))
            .await
        {
            warn!(memory_id = %memory.id, error = %e, "Vector upsert failed, memory is keyword-only");
            return None;
        }

        match self
            .with_store(self.store.set_vector_id(&memory.id, Some(&vector_id)))
            .await
        {
            Ok(true) => Some(vector_id),
            Ok(false) => {
                debug!(memory_id = %memory.id, "Memory removed before vector was linked");
                self.discard_vector(&memory.id, &vector_id).await;
                None
            }
            Err(e) => {
                warn!(memory_id = %memory.id, error = %e, "Failed to link vector, memory is keyword-only");
                self.discard_vector(&memory.id, &vector_id).await;
                None
            }
        }
    }

    async fn discard_vector(&self, memory_id: &str, vector_id: &str) {
        if let Err(e) = self.with_index(self.index.delete(vector_id)).await {
            warn!(
                memory_id,
                vector_id,
                error = %e,
                "Unlinked vector entry left behind, needs reconciliation"
            );
        }
    }

    async fn embed_best_effort(&self, memory_id: &str, content: &str) -> Option<Embedding> {
        match self.embed(content).await {
            Ok(embedding) => Some(embedding),
            Err(e) => {
                warn!(memory_id, error = %e, "Embedding failed, memory will be keyword-only");
                None
            }
        }
    }

    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        timeout(self.config.embedding_timeout, self.embedder.embed(text))
            .await
            .unwrap_or(Err(EmbeddingError::Timeout))
    }

    async fn with_store<T>(
        &self,
        call: impl Future<Output = Result<T, StoreError>>,
    ) -> Result<T, MemoryError> {
        timeout(self.config.store_timeout, call)
            .await
            .unwrap_or(Err(StoreError::Timeout))
            .map_err(MemoryError::from)
    }

    async fn with_index<T>(
        &self,
        call: impl Future<Output = Result<T, VectorError>>,
    ) -> Result<T, VectorError> {
        timeout(self.config.vector_timeout, call)
            .await
            .unwrap_or(Err(VectorError::Timeout))
    }
}

/// Current time at the precision the stores keep.
fn now() -> Timestamp {
    Utc::now().trunc_subsecs(6)
}

/// Vector key for a memory's content. Same content, same key; changed
/// content, new key.
pub fn vector_key(memory_id: &str, content: &str) -> String {
    let namespace = Uuid::parse_str(memory_id)
        .unwrap_or_else(|_| Uuid::new_v5(&Uuid::NAMESPACE_OID, memory_id.as_bytes()));
    Uuid::new_v5(&namespace, content.as_bytes()).to_string()
}
