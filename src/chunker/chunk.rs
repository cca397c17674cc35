use serde::{Deserialize, Serialize};

use super::header::HeaderFrame;

/// Header path used for content that precedes every heading
pub const DOCUMENT_ROOT: &str = "Document Root";

/// Delimiter used when a header path is rendered as one string
pub const PATH_SEPARATOR: &str = " > ";

/// A contiguous run of document lines tagged with its section hierarchy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Raw lines of the run, trimmed of surrounding whitespace
    pub content: String,
    /// Titles of the open headings, outermost first
    pub header_path: Vec<String>,
    /// Level of the heading that opened this chunk, 0 before any heading
    pub level: usize,
    /// First source line (zero-based, inclusive)
    pub start_line: usize,
    /// Last source line (zero-based, inclusive)
    pub end_line: usize,
    /// Heading frames the chunk was built from; not kept in sync with later
    /// edits to `header_path` or `level`
    ancestry: Vec<HeaderFrame>,
    /// Source line on which the trimmed content begins
    content_line: usize,
}

impl Chunk {
    /// Build a chunk from a hierarchy snapshot.
    ///
    /// An empty snapshot yields the `["Document Root"]` path.
    pub fn new(
        content: impl Into<String>,
        ancestry: Vec<HeaderFrame>,
        level: usize,
        start_line: usize,
        end_line: usize,
    ) -> Self {
        Self::with_content_line(content, ancestry, level, start_line, end_line, start_line)
    }

    pub(crate) fn with_content_line(
        content: impl Into<String>,
        ancestry: Vec<HeaderFrame>,
        level: usize,
        start_line: usize,
        end_line: usize,
        content_line: usize,
    ) -> Self {
        let header_path = if ancestry.is_empty() {
            vec![DOCUMENT_ROOT.to_string()]
        } else {
            ancestry.iter().map(|f| f.title.clone()).collect()
        };

        Self {
            content: content.into(),
            header_path,
            level,
            start_line,
            end_line,
            ancestry,
            content_line,
        }
    }

    /// Heading frames (level and title) enclosing this chunk, outermost first.
    ///
    /// This is the snapshot taken when the chunk was built. `header_path` and
    /// `level` are plain fields; records and summaries read those, so editing
    /// them changes the output but leaves this snapshot untouched.
    pub fn ancestry(&self) -> &[HeaderFrame] {
        &self.ancestry
    }

    pub(crate) fn content_line(&self) -> usize {
        self.content_line
    }

    /// Length of the content in characters
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Number of source lines covered
    pub fn line_count(&self) -> usize {
        self.end_line - self.start_line + 1
    }

    /// Header path joined with `" > "`
    pub fn joined_path(&self) -> String {
        self.header_path.join(PATH_SEPARATOR)
    }

    /// Transport projection, derived from the current fields
    pub fn to_record(&self) -> ChunkRecord {
        ChunkRecord {
            content: self.content.clone(),
            header_path: self.joined_path(),
            level: self.level,
            start_line: self.start_line,
            end_line: self.end_line,
            metadata: RecordMetadata {
                hierarchy: self.header_path.clone(),
                section_level: self.level,
            },
        }
    }

    /// One-line summary used by the CLI
    pub fn summary_line(&self, index: usize) -> String {
        format!(
            "[{}] L{} lines {}-{} ({} chars) {}",
            index,
            self.level,
            self.start_line,
            self.end_line,
            self.char_len(),
            self.joined_path()
        )
    }

    /// Copy of this chunk's hierarchy with new content and line range
    pub(crate) fn derive(
        &self,
        content: String,
        start_line: usize,
        end_line: usize,
        content_line: usize,
    ) -> Self {
        Self {
            content,
            header_path: self.header_path.clone(),
            level: self.level,
            start_line,
            end_line,
            ancestry: self.ancestry.clone(),
            content_line,
        }
    }
}

/// Serializable view of a [`Chunk`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub content: String,
    /// Header titles joined with `" > "`
    pub header_path: String,
    pub level: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub metadata: RecordMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Raw ordered header titles
    pub hierarchy: Vec<String>,
    pub section_level: usize,
}

impl ChunkRecord {
    /// Split the joined header string back into titles
    pub fn hierarchy(&self) -> Vec<String> {
        self.header_path
            .split(PATH_SEPARATOR)
            .map(str::to_string)
            .collect()
    }
}

impl From<&Chunk> for ChunkRecord {
    fn from(chunk: &Chunk) -> Self {
        chunk.to_record()
    }
}
