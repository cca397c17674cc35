use serde::{Deserialize, Serialize};

use crate::chunker::ChunkId;

/// Questions synthesized for one chunk, optionally carrying their embeddings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkQuestions {
    pub chunk_id: ChunkId,
    pub chunk_content: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    /// Set when the model's answer could not be parsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Question {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            embedding: None,
        }
    }
}

impl ChunkQuestions {
    pub fn new(chunk_id: ChunkId, chunk_content: impl Into<String>) -> Self {
        Self {
            chunk_id,
            chunk_content: chunk_content.into(),
            questions: Vec::new(),
            error: None,
        }
    }
}

// OpenAI-compatible chat completions contract

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}
