mod builder;
mod chunk;
mod error;
mod header;
mod splitter;


pub use builder::build_segments;
pub use chunk::{Chunk, ChunkRecord, RecordMetadata, DOCUMENT_ROOT, PATH_SEPARATOR};
pub use error::ChunkerError;
pub use header::{parse_header_line, HeaderFrame, HeaderStack, MAX_HEADER_LEVEL};
pub use splitter::{subdivide, PARAGRAPH_SEPARATOR};

use std::fs;
use std::path::Path;
use tracing::info;

/// Identifier handed to downstream services: the chunk's index in the output
pub type ChunkId = u32;

/// Budget used by the CLI when none is configured
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 1024;

/// Splits Markdown documents by heading structure, optionally re-splitting
/// oversized sections on paragraph boundaries.
///
/// The chunker holds no state between calls; one instance can be reused for
/// any number of documents.
#[derive(Debug, Clone, Default)]
pub struct MarkdownChunker {
    max_chunk_size: Option<usize>,
}

impl MarkdownChunker {
    /// Chunker without a size budget
    pub fn new() -> Self {
        Self::default()
    }

    /// Chunker that subdivides chunks longer than `max_chunk_size` characters
    pub fn with_max_chunk_size(max_chunk_size: usize) -> Result<Self, ChunkerError> {
        if max_chunk_size == 0 {
            return Err(ChunkerError::InvalidBudget(max_chunk_size));
        }
        Ok(Self {
            max_chunk_size: Some(max_chunk_size),
        })
    }

    /// Build from an optional budget, `None` disabling subdivision
    pub fn from_budget(max_chunk_size: Option<usize>) -> Result<Self, ChunkerError> {
        match max_chunk_size {
            Some(size) => Self::with_max_chunk_size(size),
            None => Ok(Self::new()),
        }
    }

    pub fn max_chunk_size(&self) -> Option<usize> {
        self.max_chunk_size
    }

    /// Chunk a whole document held in memory
    pub fn chunk_by_headers(&self, md_content: &str) -> Vec<Chunk> {
        let chunks = build_segments(md_content);

        match self.max_chunk_size {
            Some(max) => {
                let before = chunks.len();
                let chunks = subdivide(chunks, max);
                if chunks.len() != before {
                    info!(
                        sections = before,
                        chunks = chunks.len(),
                        max_chunk_size = max,
                        "split oversized sections"
                    );
                }
                chunks
            }
            None => chunks,
        }
    }

    /// Read a UTF-8 file in full and chunk it
    pub fn load_and_chunk(&self, path: impl AsRef<Path>) -> Result<Vec<Chunk>, ChunkerError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let chunks = self.chunk_by_headers(&content);
        info!(path = %path.display(), chunks = chunks.len(), "chunked document");
        Ok(chunks)
    }
}
