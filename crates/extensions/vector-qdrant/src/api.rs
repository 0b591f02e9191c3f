//! Qdrant REST API types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use memvault_protocols::{VectorFilter, VectorPayload};

#[derive(Debug, Serialize)]
pub struct CreateCollection {
    pub vectors: VectorParams,
}

#[derive(Debug, Serialize)]
pub struct VectorParams {
    pub size: usize,
    pub distance: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UpsertPoints<'a> {
    pub points: [Point<'a>; 1],
}

#[derive(Debug, Serialize)]
pub struct Point<'a> {
    pub id: &'a str,
    pub vector: &'a [f32],
    pub payload: &'a VectorPayload,
}

#[derive(Debug, Serialize)]
pub struct DeletePoints<'a> {
    pub points: [&'a str; 1],
}

#[derive(Debug, Serialize)]
pub struct SearchPoints<'a> {
    pub vector: &'a [f32],
    pub limit: usize,
    pub score_threshold: f32,
    pub with_payload: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,
}

/// `must` filter of exact keyword matches.
#[derive(Debug, Serialize)]
pub struct Filter {
    pub must: Vec<FieldCondition>,
}

#[derive(Debug, Serialize)]
pub struct FieldCondition {
    pub key: &'static str,
    #[serde(rename = "match")]
    pub matches: MatchValue,
}

#[derive(Debug, Serialize)]
pub struct MatchValue {
    pub value: String,
}

impl Filter {
    pub fn from_vector_filter(filter: &VectorFilter) -> Option<Self> {
        let must: Vec<FieldCondition> = [
            ("user_id", &filter.user_id),
            ("conversation_id", &filter.conversation_id),
        ]
        .into_iter()
        .filter_map(|(key, value)| {
            value.as_ref().map(|v| FieldCondition {
                key,
                matches: MatchValue { value: v.clone() },
            })
        })
        .collect();

        (!must.is_empty()).then_some(Self { must })
    }
}

/// Standard response envelope.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub result: T,
}

#[derive(Debug, Deserialize)]
pub struct ScoredPoint {
    /// UUID string or unsigned integer.
    pub id: Value,
    pub score: f32,
}

impl ScoredPoint {
    pub fn id_string(&self) -> String {
        match &self.id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_from_empty() {
        assert!(Filter::from_vector_filter(&VectorFilter::default()).is_none());
    }

    #[test]
    fn test_filter_serialization() {
        let filter = Filter::from_vector_filter(&VectorFilter {
            user_id: Some("u1".to_string()),
            conversation_id: None,
        })
        .unwrap();
        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"must": [{"key": "user_id", "match": {"value": "u1"}}]})
        );
    }

    #[test]
    fn test_scored_point_numeric_id() {
        let point: ScoredPoint = serde_json::from_str(r#"{"id": 42, "score": 0.5}"#).unwrap();
        assert_eq!(point.id_string(), "42");
        let point: ScoredPoint =
            serde_json::from_str(r#"{"id": "a-b", "score": 0.5, "version": 3}"#).unwrap();
        assert_eq!(point.id_string(), "a-b");
    }
}
