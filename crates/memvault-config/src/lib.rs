//! # memvault Config
//!
//! Configuration management for memvault: a TOML schema where every field has
//! a default, `${VAR}` environment substitution, and value validation.

mod error;
mod loader;
mod schema;
mod validator;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
pub use validator::{ConfigValidator, ValidationError, ValidationResult, ValidationWarning};
