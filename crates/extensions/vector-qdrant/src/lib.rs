//! Qdrant vector index for memvault.
//!
//! Talks to Qdrant's REST API. Point ids are the memory `vector_id`s, which
//! must be UUIDs.

mod api;
mod index;

pub use index::{QdrantConfig, QdrantIndex};
