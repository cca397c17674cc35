use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChunkerError {
    /// Reading the source document failed; the I/O error is passed through as-is
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Chunk budget must be a positive number of characters, got {0}")]
    InvalidBudget(usize),
}
