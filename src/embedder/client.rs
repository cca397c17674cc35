// client.rs - HTTP client for the embedding server
use super::{Batcher, EmbedError, EmbeddingModelInfo, EmbeddingRequest, EmbeddingResponse};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

/// Turns texts into fixed-dimension vectors, one per text, in order
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;
}

pub struct EmbeddingClient {
    http: Client,
    endpoint: String,
    model: EmbeddingModelInfo,
}

impl EmbeddingClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_model(endpoint, EmbeddingModelInfo::default())
    }

    pub fn with_model(endpoint: impl Into<String>, model: EmbeddingModelInfo) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model,
        }
    }

    pub fn model(&self) -> &EmbeddingModelInfo {
        &self.model
    }

    /// Embed texts in a single request
    pub async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let expected = texts.len();
        debug!(count = expected, endpoint = %self.endpoint, "embedding texts");

        let req = EmbeddingRequest { texts };
        let response = self
            .http
            .post(format!("{}/embed", self.endpoint))
            .json(&req)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(EmbedError::ServerError {
                status: status.as_u16(),
                body,
            });
        }

        let res: EmbeddingResponse = response.json().await?;
        self.check(expected, &res.embeddings)?;
        Ok(res.embeddings)
    }

    /// Embed texts in batches of the model's `max_batch`, preserving order
    pub async fn embed_batched(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let batcher = Batcher::new(self.model.max_batch);
        let mut all = Vec::with_capacity(texts.len());

        for batch in batcher.split(texts) {
            all.extend(self.embed(batch.to_vec()).await?);
        }

        Ok(all)
    }

    /// Embed a single query text
    pub async fn embed_one(&self, text: impl Into<String>) -> Result<Vec<f32>, EmbedError> {
        let mut vectors = self.embed(vec![text.into()]).await?;
        vectors.pop().ok_or(EmbedError::CountMismatch {
            expected: 1,
            actual: 0,
        })
    }

    pub(super) fn check(
        &self,
        expected: usize,
        embeddings: &[Vec<f32>],
    ) -> Result<(), EmbedError> {
        if embeddings.len() != expected {
            return Err(EmbedError::CountMismatch {
                expected,
                actual: embeddings.len(),
            });
        }

        if let Some(bad) = embeddings.iter().find(|v| v.len() != self.model.dim) {
            return Err(EmbedError::Dimension {
                model: self.model.name.clone(),
                expected: self.model.dim,
                actual: bad.len(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl TextEmbedder for EmbeddingClient {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        self.embed_batched(texts).await
    }
}
