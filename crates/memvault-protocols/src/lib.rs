//! # memvault Protocols
//!
//! Data model and protocol definitions (traits) shared by every memvault crate.
//! Contains only interface definitions - no storage implementations.
//!
//! ## Core Traits
//!
//! - [`MemoryStore`] - Structured (relational) persistence of memory records
//! - [`VectorIndex`] - External nearest-neighbour index holding one embedding per memory
//! - [`EmbeddingProvider`] - Text to fixed-dimension vector capability

pub mod embedding;
pub mod error;
pub mod memory;
pub mod store;
pub mod types;
pub mod vector;

pub use embedding::{Embedding, EmbeddingProvider};
pub use error::{EmbeddingError, MemoryError, StoreError, VectorError};
pub use memory::{
    DeleteOutcome, Memory, MemoryPatch, MemoryStats, NewMemory, RecentQuery, ScoredMemory,
    SearchRequest, SearchResponse, SearchType, TagCount, DEFAULT_IMPORTANCE,
};
pub use store::{MemoryStore, ScanFilter, ScanOrder, StatsQuery};
pub use types::*;
pub use vector::{VectorFilter, VectorHit, VectorIndex, VectorPayload};
