//! In-process vector index for memvault.
//!
//! A brute-force cosine index behind a lock, plus a deterministic hashing
//! embedder. Together they let the engine run semantic search with no
//! external services, at the cost of losing the index on restart.

mod embedding;
mod index;

pub use embedding::SimpleHashEmbedding;
pub use index::InMemoryVectorIndex;
