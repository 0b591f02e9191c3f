//! OpenAI embeddings API types.

use serde::{Deserialize, Serialize};

/// `POST /embeddings` request body.
#[derive(Debug, Serialize)]
pub struct EmbeddingRequest<'a> {
    pub input: &'a [&'a str],
    pub model: &'a str,
}

/// `POST /embeddings` response body.
#[derive(Debug, Deserialize)]
pub struct EmbeddingResponse {
    pub data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingData {
    #[serde(default)]
    pub index: usize,
    pub embedding: Vec<f32>,
}

/// Error envelope returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
}
