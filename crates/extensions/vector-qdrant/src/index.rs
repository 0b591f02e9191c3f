//! Qdrant-backed vector index.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use memvault_protocols::{
    Embedding, VectorError, VectorFilter, VectorHit, VectorIndex, VectorPayload,
};

use crate::api::{
    ApiResponse, CreateCollection, DeletePoints, Filter, Point, ScoredPoint, SearchPoints,
    UpsertPoints, VectorParams,
};

/// Connection settings for Qdrant.
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    /// Base URL (default: http://localhost:6333).
    pub url: String,
    /// Sent as the `api-key` header when set.
    pub api_key: Option<String>,
    /// Collection holding memory vectors (default: memories).
    pub collection: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl QdrantConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            collection: "memories".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self::new("http://localhost:6333")
    }
}

/// Vector index stored in a Qdrant collection.
pub struct QdrantIndex {
    client: reqwest::Client,
    config: QdrantConfig,
}

impl QdrantIndex {
    pub fn new(config: QdrantConfig) -> Result<Self, VectorError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| VectorError::Request(format!("HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Create the collection with cosine distance if it does not exist.
    pub async fn ensure_collection(&self, dimension: usize) -> Result<(), VectorError> {
        let response = self
            .request(Method::GET, &self.collection_path(""))
            .send()
            .await
            .map_err(request_error)?;
        if response.status().is_success() {
            return Ok(());
        }
        if response.status() != StatusCode::NOT_FOUND {
            return Err(api_error(response).await);
        }

        info!(collection = %self.config.collection, dimension, "Creating Qdrant collection");
        let body = CreateCollection {
            vectors: VectorParams {
                size: dimension,
                distance: "Cosine",
            },
        };
        self.send::<_, serde_json::Value>(Method::PUT, &self.collection_path(""), &body)
            .await?;
        Ok(())
    }

    fn collection_path(&self, suffix: &str) -> String {
        format!(
            "{}/collections/{}{}",
            self.config.url.trim_end_matches('/'),
            self.config.collection,
            suffix
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.config.api_key {
            Some(key) => builder.header("api-key", key),
            None => builder,
        }
    }

    async fn send<B, T>(&self, method: Method, url: &str, body: &B) -> Result<T, VectorError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .request(method, url)
            .json(body)
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| VectorError::InvalidResponse(e.to_string()))?;
        Ok(envelope.result)
    }
}

fn request_error(err: reqwest::Error) -> VectorError {
    if err.is_timeout() {
        VectorError::Timeout
    } else {
        VectorError::Request(err.to_string())
    }
}

async fn api_error(response: Response) -> VectorError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    VectorError::Api { status, message }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    fn id(&self) -> &str {
        "qdrant"
    }

    async fn upsert(
        &self,
        vector_id: &str,
        embedding: &Embedding,
        payload: &VectorPayload,
    ) -> Result<(), VectorError> {
        let body = UpsertPoints {
            points: [Point {
                id: vector_id,
                vector: &embedding.vector,
                payload,
            }],
        };
        self.send::<_, serde_json::Value>(
            Method::PUT,
            &self.collection_path("/points?wait=true"),
            &body,
        )
        .await?;
        debug!(vector_id, "Upserted Qdrant point");
        Ok(())
    }

    async fn delete(&self, vector_id: &str) -> Result<(), VectorError> {
        let body = DeletePoints {
            points: [vector_id],
        };
        self.send::<_, serde_json::Value>(
            Method::POST,
            &self.collection_path("/points/delete?wait=true"),
            &body,
        )
        .await?;
        debug!(vector_id, "Deleted Qdrant point");
        Ok(())
    }

    async fn query(
        &self,
        embedding: &Embedding,
        k: usize,
        min_score: f32,
        filter: &VectorFilter,
    ) -> Result<Vec<VectorHit>, VectorError> {
        let body = SearchPoints {
            vector: &embedding.vector,
            limit: k,
            score_threshold: min_score,
            with_payload: false,
            filter: Filter::from_vector_filter(filter),
        };
        let points: Vec<ScoredPoint> = self
            .send(Method::POST, &self.collection_path("/points/search"), &body)
            .await?;

        Ok(points
            .into_iter()
            .map(|p| VectorHit {
                vector_id: p.id_string(),
                score: p.score,
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), VectorError> {
        let response = self
            .request(Method::GET, &self.collection_path(""))
            .send()
            .await
            .map_err(request_error)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(api_error(response).await)
        }
    }
}

#[cfg(test)]
#[path = "index_tests.rs"]
mod tests;
