//! Error types for the memvault protocol layer.

mod embedding;
mod memory;
mod store;
mod vector;

pub use embedding::*;
pub use memory::*;
pub use store::*;
pub use vector::*;
