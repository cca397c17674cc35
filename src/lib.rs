// Public API exports
pub mod chunker;
pub mod config;
pub mod embedder;
pub mod pipeline;
pub mod questions;
pub mod search;

// Re-export main types for convenience
pub use chunker::{
    build_segments, parse_header_line, subdivide, Chunk, ChunkId, ChunkRecord, ChunkerError,
    HeaderFrame, HeaderStack, MarkdownChunker, RecordMetadata, DEFAULT_MAX_CHUNK_SIZE,
    DOCUMENT_ROOT,
};

pub use config::{
    ChunkerConfig, Config, ConfigError, EmbeddingConfig, QuestionsConfig, SearchConfig,
};

pub use embedder::{Batcher, EmbedError, EmbeddingClient, EmbeddingModelInfo, TextEmbedder};

pub use questions::{ChunkQuestions, Question, QuestionClient, QuestionError, QuestionGenerator};

pub use search::{cosine_similarity, QuestionIndex, SearchError, SearchHit};
