//! Structured store errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store operation timed out")]
    Timeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_error() {
        let err = StoreError::Query("invalid syntax".to_string());
        let display = err.to_string();
        assert!(display.contains("Query error"));
        assert!(display.contains("invalid syntax"));
    }

    #[test]
    fn test_all_error_variants() {
        let errors: Vec<StoreError> = vec![
            StoreError::Connection("a".to_string()),
            StoreError::Query("b".to_string()),
            StoreError::Serialization("c".to_string()),
            StoreError::Timeout,
        ];

        for err in errors {
            assert!(!err.to_string().is_empty());
        }
    }
}
