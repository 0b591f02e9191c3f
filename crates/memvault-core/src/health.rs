//! Dependency health reporting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Everything reachable.
    Healthy,
    /// Structured store up, vector index down: keyword-only service.
    Degraded,
    /// Structured store down.
    Unhealthy,
}

/// Component health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ComponentHealth {
    pub fn healthy() -> Self {
        Self {
            status: HealthStatus::Healthy,
            details: None,
        }
    }

    pub fn unhealthy(details: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            details: Some(details.into()),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub version: String,
    pub components: BTreeMap<String, ComponentHealth>,
}

/// Component key for the structured store.
pub const STRUCTURED_STORE: &str = "structured_store";
/// Component key for the vector index.
pub const VECTOR_INDEX: &str = "vector_index";

impl HealthReport {
    /// Combine component results into an overall status.
    pub fn from_components(store: ComponentHealth, index: ComponentHealth) -> Self {
        let status = match (store.is_healthy(), index.is_healthy()) {
            (true, true) => HealthStatus::Healthy,
            (true, false) => HealthStatus::Degraded,
            (false, _) => HealthStatus::Unhealthy,
        };

        let mut components = BTreeMap::new();
        components.insert(STRUCTURED_STORE.to_string(), store);
        components.insert(VECTOR_INDEX.to_string(), index);

        Self {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            components,
        }
    }
}
