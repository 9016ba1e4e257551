//! Text embeddings from an OpenAI-compatible `/v1/embeddings` endpoint.

use crate::config::EmbeddingConfig;
use crate::error::{RagError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Maximum number of inputs sent in one embeddings request.
const MAX_BATCH_SIZE: usize = 64;

/// A service that turns text into fixed-length vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("empty embedding response".to_string()))
    }

    /// Embed several texts, preserving input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Model identifier, for diagnostics.
    fn model(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// OpenAI-compatible embeddings client.
#[derive(Clone)]
pub struct OpenAiEmbeddings {
    client: Client,
    config: EmbeddingConfig,
}

impl OpenAiEmbeddings {
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        let base = self.config.api_base.trim_end_matches('/');
        format!("{}/v1/embeddings", base)
    }

    async fn request(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        debug!(model = %self.config.model, batch_size = texts.len(), "embedding batch");

        let request = EmbeddingRequest {
            model: &self.config.model,
            input: texts,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RagError::Embedding(format!("request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RagError::Embedding(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(RagError::Embedding(format!("API error ({}): {}", status, detail)));
        }

        parse_embeddings(&body, texts.len())
    }
}

/// Parse an embeddings response, ordering vectors by their `index` field.
fn parse_embeddings(body: &str, expected: usize) -> Result<Vec<Vec<f32>>> {
    let mut response: EmbeddingResponse = serde_json::from_str(body)
        .map_err(|e| RagError::Embedding(format!("failed to parse response: {}", e)))?;

    if response.data.len() != expected {
        return Err(RagError::Embedding(format!(
            "expected {} embeddings, got {}",
            expected,
            response.data.len()
        )));
    }

    response.data.sort_by_key(|d| d.index);
    Ok(response.data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(MAX_BATCH_SIZE) {
            embeddings.extend(self.request(batch).await?);
        }
        Ok(embeddings)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched lengths or zero-magnitude vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
