use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Failed to read or write index: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid index JSON: {0}")]
    Json(#[from] serde_json::Error),
}
