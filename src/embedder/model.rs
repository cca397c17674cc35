// model.rs - metadata about the embedding model behind the server
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingModelInfo {
    pub dim: usize,
    pub name: String,
    pub max_batch: usize,
}

impl EmbeddingModelInfo {
    pub fn new(name: impl Into<String>, dim: usize, max_batch: usize) -> Self {
        Self {
            name: name.into(),
            dim,
            max_batch,
        }
    }

    pub fn qwen3_0_6b() -> Self {
        Self::new("Qwen/Qwen3-Embedding-0.6B", 1024, 32)
    }
}

impl Default for EmbeddingModelInfo {
    fn default() -> Self {
        Self::qwen3_0_6b()
    }
}
