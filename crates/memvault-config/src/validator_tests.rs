use super::*;

#[test]
fn test_validate_default_config() {
    let config = Config::default();
    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "vector.backend"));
}

#[test]
fn test_validate_invalid_port() {
    let mut config = Config::default();
    config.server.port = 0;

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "server.port"));
}

#[test]
fn test_validate_openai_requires_api_key() {
    let mut config = Config::default();
    config.embedding.provider = EmbeddingProviderKind::OpenAI;

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "embedding.api_key"));

    config.embedding.api_key = Some("sk-test".to_string());
    assert!(ConfigValidator::validate(&config).is_valid());
}

#[test]
fn test_missing_api_key_is_missing_field() {
    let mut config = Config::default();
    config.embedding.provider = EmbeddingProviderKind::OpenAI;
    config.embedding.api_key = Some(String::new());

    match config.validate() {
        Err(ConfigError::MissingField(field)) => assert_eq!(field, "embedding.api_key"),
        other => panic!("expected MissingField, got {:?}", other),
    }
}

#[test]
fn test_validate_qdrant_url() {
    let mut config = Config::default();
    config.vector.backend = VectorBackend::Qdrant;
    config.vector.url = "qdrant:6333".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "vector.url"));
    assert!(!result.warnings.iter().any(|w| w.path == "vector.backend"));
}

#[test]
fn test_validate_zero_dimension() {
    let mut config = Config::default();
    config.embedding.dimension = 0;

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "embedding.dimension"));
}

#[test]
fn test_validate_engine_limits() {
    let mut config = Config::default();
    config.engine.max_content_length = 0;
    config.engine.stats_window_days = 0;

    let result = ConfigValidator::validate(&config);
    assert_eq!(result.errors.len(), 2);
}

#[test]
fn test_config_validate_returns_invalid_value() {
    let mut config = Config::default();
    config.engine.store_timeout_ms = 0;

    match config.validate() {
        Err(ConfigError::InvalidValue { field, .. }) => {
            assert_eq!(field, "engine.store_timeout_ms");
        }
        other => panic!("expected InvalidValue, got {:?}", other),
    }
}

#[test]
fn test_config_validate_ok_returns_warnings() {
    let warnings = Config::default().validate().unwrap();
    assert_eq!(warnings.len(), 1);
}
