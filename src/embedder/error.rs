use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Server returned error status {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Expected {expected} embeddings, server returned {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Expected {expected}-dim vectors from {model}, got {actual}")]
    Dimension {
        model: String,
        expected: usize,
        actual: usize,
    },
}
