pub mod batcher;
pub mod client;
pub mod error;
pub mod model;
pub mod types;


pub use batcher::Batcher;
pub use client::{EmbeddingClient, TextEmbedder};
pub use error::EmbedError;
pub use model::EmbeddingModelInfo;
pub use types::{EmbeddingRequest, EmbeddingResponse};
