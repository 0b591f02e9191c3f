//! Memory data model.
//!
//! A [`Memory`] is the only persisted entity. Requests ([`NewMemory`],
//! [`MemoryPatch`], [`SearchRequest`], [`RecentQuery`]) and responses
//! ([`SearchResponse`], [`MemoryStats`], [`DeleteOutcome`]) are plain serde
//! types so the API layer can map them one-to-one.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Metadata, Timestamp};

/// Default importance assigned when a caller does not supply one.
pub const DEFAULT_IMPORTANCE: u8 = 1;

/// A persisted memory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    /// Globally unique identifier, immutable.
    pub id: String,

    /// Memory text.
    pub content: String,

    /// Optional short classification (e.g. "user_preferences").
    #[serde(default)]
    pub context: Option<String>,

    /// Tags in insertion order.
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub conversation_id: Option<String>,

    /// Importance in `[1, 10]`.
    pub importance_score: u8,

    /// Caller-owned key/value data.
    #[serde(default)]
    pub metadata: Metadata,

    /// Number of successful reads by id.
    pub access_count: u64,

    /// Time of the last read by id.
    #[serde(default)]
    pub last_accessed: Option<Timestamp>,

    pub created_at: Timestamp,

    pub updated_at: Timestamp,

    /// Key of this memory's entry in the vector index. `None` marks a
    /// keyword-only (degraded) record.
    #[serde(default)]
    pub vector_id: Option<String>,
}

impl Memory {
    /// Whether this memory has an entry in the vector index.
    pub fn is_semantic(&self) -> bool {
        self.vector_id.is_some()
    }
}

/// Input for creating a memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMemory {
    pub content: String,

    #[serde(default)]
    pub context: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub conversation_id: Option<String>,

    #[serde(default)]
    pub importance_score: Option<u8>,

    #[serde(default)]
    pub metadata: Metadata,
}

impl NewMemory {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    pub fn with_importance(mut self, importance: u8) -> Self {
        self.importance_score = Some(importance);
        self
    }
}

/// Partial update. Only `Some` fields are applied.
///
/// `user_id` and `conversation_id` are deliberately absent: they are fixed at
/// creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryPatch {
    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub context: Option<String>,

    #[serde(default)]
    pub tags: Option<Vec<String>>,

    #[serde(default)]
    pub importance_score: Option<u8>,

    #[serde(default)]
    pub metadata: Option<Metadata>,
}

impl MemoryPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.context.is_none()
            && self.tags.is_none()
            && self.importance_score.is_none()
            && self.metadata.is_none()
    }
}

fn default_limit() -> usize {
    10
}

fn default_min_similarity() -> f32 {
    0.7
}

fn default_true() -> bool {
    true
}

/// Hybrid search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,

    #[serde(default)]
    pub context: Option<String>,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub conversation_id: Option<String>,

    /// Every listed tag must be present on a result.
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default = "default_limit")]
    pub limit: usize,

    #[serde(default = "default_min_similarity")]
    pub min_similarity: f32,

    #[serde(default = "default_true")]
    pub include_semantic: bool,

    #[serde(default = "default_true")]
    pub include_keyword: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            context: None,
            user_id: None,
            conversation_id: None,
            tags: Vec::new(),
            limit: default_limit(),
            min_similarity: default_min_similarity(),
            include_semantic: true,
            include_keyword: true,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_min_similarity(mut self, min_similarity: f32) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    pub fn keyword_only(mut self) -> Self {
        self.include_semantic = false;
        self.include_keyword = true;
        self
    }

    pub fn semantic_only(mut self) -> Self {
        self.include_semantic = true;
        self.include_keyword = false;
        self
    }
}

/// Which retrieval modes produced the returned results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Semantic,
    Keyword,
    Hybrid,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Semantic => "semantic",
            Self::Keyword => "keyword",
            Self::Hybrid => "hybrid",
        }
    }

    /// Whether keyword matching is part of this search type.
    pub fn includes_keyword(&self) -> bool {
        matches!(self, Self::Keyword | Self::Hybrid)
    }

    /// Whether semantic matching is part of this search type.
    pub fn includes_semantic(&self) -> bool {
        matches!(self, Self::Semantic | Self::Hybrid)
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMemory {
    #[serde(flatten)]
    pub memory: Memory,

    /// Cosine similarity for semantic hits; `None` for keyword-only hits.
    pub similarity_score: Option<f32>,
}

/// Hybrid search response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub memories: Vec<ScoredMemory>,
    pub total_count: usize,
    pub search_type: SearchType,
    pub query_time_ms: f64,
}

/// Listing request ordered by recency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,

    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default)]
    pub context: Option<String>,
}

impl Default for RecentQuery {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            user_id: None,
            context: None,
        }
    }
}

impl RecentQuery {
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn for_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }
}

/// A tag and how many memories carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

/// Aggregate statistics over the structured store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    pub total_memories: u64,
    /// Distinct non-null `user_id` values.
    pub total_users: u64,
    pub memories_by_context: BTreeMap<String, u64>,
    /// Keyed by UTC calendar day (`YYYY-MM-DD`).
    pub memories_by_day: BTreeMap<String, u64>,
    pub top_tags: Vec<TagCount>,
    pub avg_access_count: f64,
}

/// Result of a delete that removed the structured record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// Record and vector entry both removed.
    Purged,
    /// The record had no vector entry.
    KeywordOnly,
    /// Record removed but its vector entry could not be; needs reconciliation.
    VectorOrphaned { vector_id: String, reason: String },
}

impl DeleteOutcome {
    /// Reconciliation warning for a partially purged memory, if any.
    pub fn warning(&self) -> Option<String> {
        match self {
            Self::VectorOrphaned { vector_id, reason } => Some(format!(
                "vector entry {} was not removed: {}",
                vector_id, reason
            )),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
