//! Structured store protocol.
//!
//! The structured store owns memory metadata in a relational table. It is a
//! single-store adapter: it knows nothing about the vector index.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::memory::{Memory, MemoryPatch, MemoryStats};
use crate::types::Timestamp;

/// Core trait for structured memory stores.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Returns the store ID.
    fn id(&self) -> &str;

    /// Insert a new record.
    async fn insert(&self, memory: &Memory) -> Result<(), StoreError>;

    /// Fetch a record without touching access statistics.
    async fn get(&self, id: &str) -> Result<Option<Memory>, StoreError>;

    /// Atomically bump `access_count` and `last_accessed`, returning the
    /// post-increment record.
    async fn record_access(&self, id: &str, at: Timestamp) -> Result<Option<Memory>, StoreError>;

    /// Apply a patch. When `patch.content` is set the stored `vector_id` is
    /// cleared in the same write.
    async fn update(
        &self,
        id: &str,
        patch: &MemoryPatch,
        at: Timestamp,
    ) -> Result<Option<Memory>, StoreError>;

    /// Set or clear the vector correlation. Does not touch `updated_at`.
    /// Returns whether a record was changed.
    async fn set_vector_id(&self, id: &str, vector_id: Option<&str>) -> Result<bool, StoreError>;

    /// Delete a record, returning it as it was just before removal.
    async fn delete(&self, id: &str) -> Result<Option<Memory>, StoreError>;

    /// Filtered, ordered, bounded listing.
    async fn scan(
        &self,
        filter: &ScanFilter,
        order: ScanOrder,
        limit: usize,
    ) -> Result<Vec<Memory>, StoreError>;

    /// Aggregate statistics computed without loading memory bodies.
    async fn aggregate(&self, query: &StatsQuery) -> Result<MemoryStats, StoreError>;

    /// Cheap liveness probe.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Filters for [`MemoryStore::scan`]. All set filters must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanFilter {
    /// Case-insensitive substring matched against content or any tag.
    pub text: Option<String>,
    pub context: Option<String>,
    pub user_id: Option<String>,
    pub conversation_id: Option<String>,
    /// Every listed tag must be present.
    pub tags: Vec<String>,
    /// Restrict to records correlated with one of these vector ids.
    pub vector_ids: Option<Vec<String>>,
}

impl ScanFilter {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn vector_ids(ids: Vec<String>) -> Self {
        Self {
            vector_ids: Some(ids),
            ..Default::default()
        }
    }

    /// Whether a record satisfies the metadata filters (everything except
    /// `text` and `vector_ids`).
    pub fn matches_metadata(&self, memory: &Memory) -> bool {
        fn eq(filter: &Option<String>, value: &Option<String>) -> bool {
            filter.as_ref().is_none_or(|f| value.as_ref() == Some(f))
        }

        eq(&self.context, &memory.context)
            && eq(&self.user_id, &memory.user_id)
            && eq(&self.conversation_id, &memory.conversation_id)
            && self.tags.iter().all(|t| memory.tags.contains(t))
    }
}

/// Result ordering for [`MemoryStore::scan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOrder {
    /// `importance_score` desc, then `created_at` desc.
    Importance,
    /// `created_at` desc, then insertion order desc.
    Newest,
}

/// Parameters for [`MemoryStore::aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsQuery {
    /// Number of most frequent tags to report.
    pub top_tags: usize,
    /// Only days within this many days before `now` appear in `memories_by_day`.
    pub window_days: u32,
    pub now: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metadata;

    fn memory(context: Option<&str>, user: Option<&str>, tags: &[&str]) -> Memory {
        let now = chrono::Utc::now();
        Memory {
            id: "m".to_string(),
            content: "content".to_string(),
            context: context.map(String::from),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            user_id: user.map(String::from),
            conversation_id: None,
            importance_score: 1,
            metadata: Metadata::new(),
            access_count: 0,
            last_accessed: None,
            created_at: now,
            updated_at: now,
            vector_id: None,
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = ScanFilter::default();
        assert!(filter.matches_metadata(&memory(None, None, &[])));
        assert!(filter.matches_metadata(&memory(Some("a"), Some("u"), &["t"])));
    }

    #[test]
    fn test_filter_context_and_user() {
        let filter = ScanFilter {
            context: Some("a".to_string()),
            user_id: Some("u".to_string()),
            ..Default::default()
        };
        assert!(filter.matches_metadata(&memory(Some("a"), Some("u"), &[])));
        assert!(!filter.matches_metadata(&memory(Some("b"), Some("u"), &[])));
        assert!(!filter.matches_metadata(&memory(Some("a"), None, &[])));
    }

    #[test]
    fn test_filter_requires_all_tags() {
        let filter = ScanFilter {
            tags: vec!["x".to_string(), "y".to_string()],
            ..Default::default()
        };
        assert!(filter.matches_metadata(&memory(None, None, &["y", "x", "z"])));
        assert!(!filter.matches_metadata(&memory(None, None, &["x"])));
    }

    #[test]
    fn test_filter_constructors() {
        assert_eq!(ScanFilter::text("q").text.as_deref(), Some("q"));
        let filter = ScanFilter::vector_ids(vec!["v".to_string()]);
        assert_eq!(filter.vector_ids.unwrap(), vec!["v".to_string()]);
    }
}
