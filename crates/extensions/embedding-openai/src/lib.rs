//! OpenAI-compatible embedding provider for memvault.

mod api;
mod embedding;

pub use embedding::{OpenAIEmbedding, OpenAIEmbeddingConfig};
