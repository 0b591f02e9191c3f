//! Common utility types.

use std::collections::HashMap;

/// Metadata map type.
pub type Metadata = HashMap<String, serde_json::Value>;

/// Timestamp type used for every persisted instant.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
