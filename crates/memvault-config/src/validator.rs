//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::{Config, EmbeddingProviderKind, VectorBackend};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Convert the first error into a [`ConfigError`]: an absent required
    /// field becomes `MissingField`, anything else `InvalidValue`.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(err) if err.missing => Err(ConfigError::MissingField(err.path)),
            Some(err) => Err(ConfigError::invalid(&err.path, err.message)),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
    /// The field is required but absent or empty.
    pub missing: bool,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            missing: false,
        }
    }

    pub fn missing(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            missing: true,
            ..Self::new(path, message)
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration, collecting every problem.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_server(config, &mut result);
        Self::validate_vector(config, &mut result);
        Self::validate_embedding(config, &mut result);
        Self::validate_engine(config, &mut result);
        Self::validate_logging(config, &mut result);

        result
    }

    fn validate_server(config: &Config, result: &mut ValidationResult) {
        if config.server.port == 0 {
            result.add_error(ValidationError::new("server.port", "Port cannot be 0"));
        }

        if config.server.host.is_empty() {
            result.add_error(ValidationError::new("server.host", "Host cannot be empty"));
        }
    }

    fn validate_vector(config: &Config, result: &mut ValidationResult) {
        let vector = &config.vector;
        if vector.timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "vector.timeout_ms",
                "timeout_ms must be greater than 0",
            ));
        }

        if vector.backend == VectorBackend::Qdrant {
            if !is_http_url(&vector.url) {
                result.add_error(ValidationError::new(
                    "vector.url",
                    "url must start with http:// or https://",
                ));
            }
            if vector.collection.is_empty() {
                result.add_error(ValidationError::new(
                    "vector.collection",
                    "Collection name cannot be empty",
                ));
            }
        } else {
            result.add_warning(ValidationWarning::new(
                "vector.backend",
                "In-memory vector index is not persisted; semantic search is empty after restart",
            ));
        }
    }

    fn validate_embedding(config: &Config, result: &mut ValidationResult) {
        let embedding = &config.embedding;
        if embedding.dimension == 0 {
            result.add_error(ValidationError::new(
                "embedding.dimension",
                "dimension must be greater than 0",
            ));
        }

        if embedding.timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "embedding.timeout_ms",
                "timeout_ms must be greater than 0",
            ));
        }

        if embedding.provider == EmbeddingProviderKind::OpenAI {
            if embedding.api_key.as_deref().is_none_or(str::is_empty) {
                result.add_error(ValidationError::missing(
                    "embedding.api_key",
                    "api_key is required for the openai provider",
                ));
            }
            if !is_http_url(&embedding.base_url) {
                result.add_error(ValidationError::new(
                    "embedding.base_url",
                    "base_url must start with http:// or https://",
                ));
            }
        }
    }

    fn validate_engine(config: &Config, result: &mut ValidationResult) {
        let engine = &config.engine;
        if engine.store_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "engine.store_timeout_ms",
                "store_timeout_ms must be greater than 0",
            ));
        }

        if engine.max_content_length == 0 {
            result.add_error(ValidationError::new(
                "engine.max_content_length",
                "max_content_length must be greater than 0",
            ));
        }

        if engine.stats_window_days == 0 {
            result.add_error(ValidationError::new(
                "engine.stats_window_days",
                "stats_window_days must be greater than 0",
            ));
        }
    }

    fn validate_logging(config: &Config, result: &mut ValidationResult) {
        if config.logging.level.trim().is_empty() {
            result.add_error(ValidationError::new(
                "logging.level",
                "Log level cannot be empty",
            ));
        }
    }
}

impl Config {
    /// Reject invalid values, returning any warnings on success.
    pub fn validate(&self) -> Result<Vec<ValidationWarning>, ConfigError> {
        ConfigValidator::validate(self).into_result()
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
