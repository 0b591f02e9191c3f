//! HTTP interface module.
//!
//! - Memory CRUD, batch create, recent listing and hybrid search
//! - Aggregate statistics
//! - Health check and Prometheus metrics

pub mod handlers;
pub mod metrics;
pub mod routes;

pub(crate) mod monitoring;
