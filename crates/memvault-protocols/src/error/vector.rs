//! Vector index errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VectorError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Vector index operation timed out")]
    Timeout,
}
