//! Engine-level error taxonomy.

use thiserror::Error;

use super::{StoreError, VectorError};

/// Errors returned by memory engine operations.
///
/// A write that succeeds without a vector is not an error: it shows up as a
/// `None` vector id on the returned record.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// Malformed input. Not retryable.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No record for the given id.
    #[error("Memory not found: {0}")]
    NotFound(String),

    /// A backing store is unreachable or failed. The caller may retry.
    #[error("{component} unavailable: {message}")]
    Dependency { component: String, message: String },
}

impl MemoryError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn dependency(component: impl Into<String>, message: impl ToString) -> Self {
        Self::Dependency {
            component: component.into(),
            message: message.to_string(),
        }
    }

    /// Stable machine-readable kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Dependency { .. } => "dependency_error",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Dependency { .. })
    }
}

impl From<StoreError> for MemoryError {
    fn from(err: StoreError) -> Self {
        Self::dependency("structured store", err)
    }
}

impl From<VectorError> for MemoryError {
    fn from(err: VectorError) -> Self {
        Self::dependency("vector index", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = MemoryError::validation("content cannot be empty");
        assert!(err.to_string().contains("Validation error"));
        assert!(err.to_string().contains("content cannot be empty"));
        assert_eq!(err.kind(), "validation_error");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_not_found_error() {
        let err = MemoryError::NotFound("entry-123".to_string());
        let display = err.to_string();
        assert!(display.contains("not found"));
        assert!(display.contains("entry-123"));
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn test_from_store_error() {
        let err: MemoryError = StoreError::Connection("refused".to_string()).into();
        assert!(err.is_retryable());
        assert!(err.to_string().contains("structured store unavailable"));
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn test_from_vector_error() {
        let err: MemoryError = VectorError::Timeout.into();
        match err {
            MemoryError::Dependency { component, .. } => assert_eq!(component, "vector index"),
            other => panic!("expected dependency error, got {:?}", other),
        }
    }

    #[test]
    fn test_error_debug() {
        let err = MemoryError::NotFound("test".to_string());
        let debug = format!("{:?}", err);
        assert!(debug.contains("NotFound"));
    }
}
