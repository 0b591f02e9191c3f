//! # memvault Core
//!
//! The memory engine: the only component that holds cross-store invariants.
//!
//! - Writes are a saga (embed, structured write, vector write). A failure after
//!   the structured write leaves a keyword-only record instead of an error.
//! - Reads by id bump access statistics atomically in the structured store.
//! - Hybrid search runs keyword and semantic branches concurrently and fuses
//!   them under one ranking.

pub mod config;
pub mod engine;
pub mod fusion;
pub mod health;
pub mod validation;

pub use config::EngineConfig;
pub use engine::MemoryEngine;
pub use health::{ComponentHealth, HealthReport, HealthStatus};
