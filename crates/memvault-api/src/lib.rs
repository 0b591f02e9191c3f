//! # memvault API
//!
//! Thin HTTP layer over [`memvault_core::MemoryEngine`].
//!
//! Handlers only translate between HTTP and engine calls: every invariant
//! lives in the engine. Memory routes are nested under `/api/v1`; the health
//! check is served at `/health` and Prometheus metrics at `/metrics`.

pub mod error;
pub mod http;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use http::metrics::install_recorder;
pub use http::routes::create_router;
pub use server::{ApiServer, ServerSettings};
pub use state::AppState;
