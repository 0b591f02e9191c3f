//! Engine configuration.

use std::time::Duration;

/// Largest accepted `create_batch` input.
pub const MAX_BATCH_SIZE: usize = 100;

/// Largest accepted `limit` for search and listings.
pub const MAX_LIMIT: usize = 100;

/// Maximum length of `context`, `user_id`, `conversation_id` and each tag.
pub const MAX_FIELD_LENGTH: usize = 255;

/// Runtime settings for [`crate::MemoryEngine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Bound on every embedding call.
    pub embedding_timeout: Duration,
    /// Bound on every structured store call.
    pub store_timeout: Duration,
    /// Bound on every vector index call.
    pub vector_timeout: Duration,
    /// Maximum content length in characters.
    pub max_content_length: usize,
    /// Number of tags reported by `stats`.
    pub stats_top_tags: usize,
    /// Days covered by `memories_by_day`.
    pub stats_window_days: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            embedding_timeout: Duration::from_secs(10),
            store_timeout: Duration::from_secs(5),
            vector_timeout: Duration::from_secs(5),
            max_content_length: 10_000,
            stats_top_tags: 10,
            stats_window_days: 30,
        }
    }
}

impl EngineConfig {
    pub fn with_embedding_timeout(mut self, timeout: Duration) -> Self {
        self.embedding_timeout = timeout;
        self
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn with_vector_timeout(mut self, timeout: Duration) -> Self {
        self.vector_timeout = timeout;
        self
    }

    pub fn with_max_content_length(mut self, max: usize) -> Self {
        self.max_content_length = max;
        self
    }
}
