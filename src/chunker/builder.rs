use tracing::debug;

use super::chunk::Chunk;
use super::header::{parse_header_line, HeaderFrame, HeaderStack};

/// Lines collected since the last heading boundary
struct PendingRun<'a> {
    lines: Vec<&'a str>,
    start: usize,
    level: usize,
    ancestry: Vec<HeaderFrame>,
}

impl<'a> PendingRun<'a> {
    fn root() -> Self {
        Self {
            lines: Vec::new(),
            start: 0,
            level: 0,
            ancestry: Vec::new(),
        }
    }

    /// Close the run into a chunk ending at `end_line`
    fn close(self, end_line: usize) -> Chunk {
        let joined = self.lines.join("\n");
        let content = joined.trim();
        let leading = joined.len() - joined.trim_start().len();
        let content_line = self.start + joined[..leading].matches('\n').count();

        Chunk::with_content_line(
            content,
            self.ancestry,
            self.level,
            self.start,
            end_line,
            content_line,
        )
    }
}

/// Split a Markdown document into one chunk per heading-delimited run.
///
/// A run starts at a heading line (inclusive) and ends on the line before the
/// next heading or at the last line. Text before the first heading forms a
/// level-0 chunk under "Document Root". Lines are split on `'\n'`, so the
/// chunks partition `0..=line_count - 1` with no gaps or overlaps.
pub fn build_segments(text: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut stack = HeaderStack::new();
    let mut pending = PendingRun::root();
    let mut last_index = 0;

    for (i, line) in text.split('\n').enumerate() {
        last_index = i;

        let Some(frame) = parse_header_line(line) else {
            pending.lines.push(line);
            continue;
        };

        let level = frame.level;
        stack.push(frame);

        let next = PendingRun {
            lines: vec![line],
            start: i,
            level,
            ancestry: stack.snapshot(),
        };
        let finished = std::mem::replace(&mut pending, next);
        if !finished.lines.is_empty() {
            chunks.push(finished.close(i - 1));
        }
    }

    if !pending.lines.is_empty() {
        chunks.push(pending.close(last_index));
    }

    debug!(
        chunks = chunks.len(),
        lines = last_index + 1,
        "built header segments"
    );

    chunks
}
