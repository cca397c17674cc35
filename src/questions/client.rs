use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::parse::parse_questions;
use super::prompt::build_prompt;
use super::types::{ChatMessage, ChatRequest, ChatResponse, ChunkQuestions};
use crate::chunker::ChunkId;

#[derive(Debug, Error)]
pub enum QuestionError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Server returned error status {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Response contained no choices")]
    EmptyResponse,
}

/// Produces the questions a chunk can answer
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(
        &self,
        chunk_id: ChunkId,
        chunk_content: &str,
    ) -> Result<ChunkQuestions, QuestionError>;
}

/// Client for an OpenAI-compatible chat completions endpoint
pub struct QuestionClient {
    http: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    max_tokens: u32,
}

impl QuestionClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        Self::with_timeout(endpoint, model, Duration::from_secs(180)) // LLM generation is slow
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, QuestionError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: None,
            max_tokens: 800,
        })
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one prompt and return the assistant's text
    async fn complete(&self, prompt: String) -> Result<String, QuestionError> {
        let req = ChatRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
        };

        let mut request = self
            .http
            .post(format!("{}/chat/completions", self.endpoint))
            .json(&req);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(QuestionError::ServerError {
                status: status.as_u16(),
                body,
            });
        }

        let res: ChatResponse = response.json().await?;
        res.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or(QuestionError::EmptyResponse)
    }
}

#[async_trait]
impl QuestionGenerator for QuestionClient {
    async fn generate(
        &self,
        chunk_id: ChunkId,
        chunk_content: &str,
    ) -> Result<ChunkQuestions, QuestionError> {
        debug!(chunk_id, model = %self.model, "generating questions");
        let answer = self.complete(build_prompt(chunk_id, chunk_content)).await?;
        Ok(questions_from_answer(chunk_id, chunk_content, &answer))
    }
}

/// Build the result for one chunk from the model's raw answer.
///
/// The chunk id and content always come from the request, never from the
/// model's echo. An unparseable answer yields no questions and an `error`.
pub fn questions_from_answer(
    chunk_id: ChunkId,
    chunk_content: &str,
    answer: &str,
) -> ChunkQuestions {
    let mut result = ChunkQuestions::new(chunk_id, chunk_content);

    match parse_questions(answer) {
        Ok(questions) => result.questions = questions,
        Err(reason) => {
            warn!(chunk_id, reason, "could not parse questions from model answer");
            result.error = Some(reason.to_string());
        }
    }

    result
}
