//! SQLite structured store for memvault.
//!
//! Persists memory records, their ordered tags and access statistics. Knows
//! nothing about the vector index beyond the opaque `vector_id` column.

mod rows;
mod schema;
mod store;

pub use store::SqliteMemoryStore;
