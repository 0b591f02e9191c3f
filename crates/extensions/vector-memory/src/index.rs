//! Brute-force vector index.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::trace;

use memvault_protocols::{
    Embedding, VectorError, VectorFilter, VectorHit, VectorIndex, VectorPayload,
};

struct Entry {
    embedding: Embedding,
    payload: VectorPayload,
}

/// Simple in-memory vector index using brute-force search.
pub struct InMemoryVectorIndex {
    vectors: RwLock<HashMap<String, Entry>>,
    dimension: Option<usize>,
}

impl InMemoryVectorIndex {
    /// Create an index that accepts embeddings of any dimension.
    pub fn new() -> Self {
        Self {
            vectors: RwLock::new(HashMap::new()),
            dimension: None,
        }
    }

    /// Create an index that rejects embeddings whose dimension differs.
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            vectors: RwLock::new(HashMap::new()),
            dimension: Some(dimension),
        }
    }

    /// Payload stored under `vector_id`, if any.
    pub fn payload(&self, vector_id: &str) -> Option<VectorPayload> {
        self.vectors
            .read()
            .get(vector_id)
            .map(|entry| entry.payload.clone())
    }

    pub fn contains(&self, vector_id: &str) -> bool {
        self.vectors.read().contains_key(vector_id)
    }

    /// Get the number of vectors in the index.
    pub fn len(&self) -> usize {
        self.vectors.read().len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.vectors.read().is_empty()
    }

    fn check_dimension(&self, embedding: &Embedding) -> Result<(), VectorError> {
        match self.dimension {
            Some(expected) if expected != embedding.dimension => Err(VectorError::Request(format!(
                "expected dimension {}, got {}",
                expected, embedding.dimension
            ))),
            _ => Ok(()),
        }
    }
}

impl Default for InMemoryVectorIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    fn id(&self) -> &str {
        "memory"
    }

    async fn upsert(
        &self,
        vector_id: &str,
        embedding: &Embedding,
        payload: &VectorPayload,
    ) -> Result<(), VectorError> {
        self.check_dimension(embedding)?;
        self.vectors.write().insert(
            vector_id.to_string(),
            Entry {
                embedding: embedding.clone(),
                payload: payload.clone(),
            },
        );
        trace!(vector_id, "Upserted vector");
        Ok(())
    }

    async fn delete(&self, vector_id: &str) -> Result<(), VectorError> {
        self.vectors.write().remove(vector_id);
        Ok(())
    }

    async fn query(
        &self,
        embedding: &Embedding,
        k: usize,
        min_score: f32,
        filter: &VectorFilter,
    ) -> Result<Vec<VectorHit>, VectorError> {
        self.check_dimension(embedding)?;
        let vectors = self.vectors.read();
        let mut hits: Vec<VectorHit> = vectors
            .iter()
            .filter(|(_, entry)| filter.matches(&entry.payload))
            .map(|(id, entry)| VectorHit {
                vector_id: id.clone(),
                score: embedding.cosine_similarity(&entry.embedding),
            })
            .filter(|hit| hit.score >= min_score)
            .collect();

        // Score descending, id ascending for a stable order
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.vector_id.cmp(&b.vector_id))
        });

        hits.truncate(k);
        Ok(hits)
    }

    async fn ping(&self) -> Result<(), VectorError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;
