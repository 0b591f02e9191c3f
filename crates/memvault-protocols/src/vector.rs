//! Vector index protocol.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::embedding::Embedding;
use crate::error::VectorError;

/// Core trait for vector similarity indexes.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Returns the index ID.
    fn id(&self) -> &str;

    /// Insert or replace the entry stored under `vector_id`.
    async fn upsert(
        &self,
        vector_id: &str,
        embedding: &Embedding,
        payload: &VectorPayload,
    ) -> Result<(), VectorError>;

    /// Remove the entry stored under `vector_id`. Removing a missing entry is
    /// not an error.
    async fn delete(&self, vector_id: &str) -> Result<(), VectorError>;

    /// Top-`k` entries by cosine similarity with score at least `min_score`,
    /// best first.
    async fn query(
        &self,
        embedding: &Embedding,
        k: usize,
        min_score: f32,
        filter: &VectorFilter,
    ) -> Result<Vec<VectorHit>, VectorError>;

    /// Cheap liveness probe.
    async fn ping(&self) -> Result<(), VectorError>;
}

/// Data stored next to a vector.
///
/// Only fields that never change after creation are used for index-side
/// filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorPayload {
    pub memory_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Exact-match payload filter applied inside the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VectorFilter {
    pub user_id: Option<String>,
    pub conversation_id: Option<String>,
}

impl VectorFilter {
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none() && self.conversation_id.is_none()
    }

    /// Whether a payload passes this filter.
    pub fn matches(&self, payload: &VectorPayload) -> bool {
        self.user_id
            .as_ref()
            .is_none_or(|u| payload.user_id.as_ref() == Some(u))
            && self
                .conversation_id
                .as_ref()
                .is_none_or(|c| payload.conversation_id.as_ref() == Some(c))
    }
}

/// A nearest-neighbour hit.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    pub vector_id: String,
    pub score: f32,
}
