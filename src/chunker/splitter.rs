use tracing::debug;

use super::chunk::Chunk;

/// Separator between paragraphs inside a chunk
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

const SEPARATOR_CHARS: usize = 2;

/// A paragraph of a chunk's content with its position
struct Paragraph<'a> {
    text: &'a str,
    /// Character count
    len: usize,
    /// Line offset from the first content line
    line_offset: usize,
}

/// Split every chunk longer than `max_chars` into paragraph-packed sub-chunks.
///
/// Chunks within budget pass through unchanged. Sub-chunks never cross an
/// original chunk boundary and keep the parent's header path and level.
pub fn subdivide(chunks: Vec<Chunk>, max_chars: usize) -> Vec<Chunk> {
    let mut result = Vec::with_capacity(chunks.len());

    for chunk in chunks {
        if chunk.char_len() <= max_chars {
            result.push(chunk);
            continue;
        }

        let pieces = split_chunk(&chunk, max_chars);
        debug!(
            path = %chunk.joined_path(),
            chars = chunk.char_len(),
            pieces = pieces.len(),
            "subdivided oversized chunk"
        );
        result.extend(pieces);
    }

    result
}

/// Greedily pack paragraphs into sub-chunks of at most `max_chars`.
///
/// A paragraph that alone exceeds the budget is kept whole. Line ranges are
/// exact: they are derived from newline counts, and the sub-chunks of one
/// parent partition the parent's line range.
fn split_chunk(chunk: &Chunk, max_chars: usize) -> Vec<Chunk> {
    let paragraphs = split_paragraphs(&chunk.content);

    let mut groups: Vec<Vec<Paragraph>> = Vec::new();
    let mut current: Vec<Paragraph> = Vec::new();
    let mut current_len = 0;

    for para in paragraphs {
        let packed_len = if current.is_empty() {
            para.len
        } else {
            current_len + SEPARATOR_CHARS + para.len
        };

        // Check if adding this paragraph would exceed the limit
        if packed_len > max_chars && !current.is_empty() {
            groups.push(std::mem::take(&mut current));
            current_len = para.len;
        } else {
            current_len = packed_len;
        }
        current.push(para);
    }

    if !current.is_empty() {
        groups.push(current);
    }

    let content_lines: Vec<usize> = groups
        .iter()
        .map(|group| chunk.content_line() + group[0].line_offset)
        .collect();

    groups
        .iter()
        .enumerate()
        .map(|(k, group)| {
            let start_line = if k == 0 {
                chunk.start_line
            } else {
                content_lines[k]
            };
            let end_line = content_lines
                .get(k + 1)
                .map(|next| next - 1)
                .unwrap_or(chunk.end_line);
            let content = group
                .iter()
                .map(|p| p.text)
                .collect::<Vec<_>>()
                .join(PARAGRAPH_SEPARATOR);
            chunk.derive(content, start_line, end_line, content_lines[k])
        })
        .collect()
}

fn split_paragraphs(content: &str) -> Vec<Paragraph<'_>> {
    let mut line_offset = 0;

    content
        .split(PARAGRAPH_SEPARATOR)
        .map(|text| {
            let para = Paragraph {
                text,
                len: text.chars().count(),
                line_offset,
            };
            line_offset += text.matches('\n').count() + SEPARATOR_CHARS;
            para
        })
        .collect()
}

#[cfg(test)]
mod split_tests {
    use super::*;
    use crate::chunker::header::HeaderFrame;

    fn make_chunk(content: &str, start_line: usize) -> Chunk {
        let end_line = start_line + content.matches('\n').count();
        Chunk::new(
            content,
            vec![HeaderFrame::new(1, "Top"), HeaderFrame::new(3, "Leaf")],
            3,
            start_line,
            end_line,
        )
    }

    #[test]
    fn test_within_budget_passes_through() {
        let chunk = make_chunk("short", 4);
        let out = subdivide(vec![chunk.clone()], 100);
        assert_eq!(out, vec![chunk]);
    }

    #[test]
    fn test_paragraph_line_offsets() {
        let paras = split_paragraphs("a\nb\n\nc\n\n\n\nd");
        let offsets: Vec<usize> = paras.iter().map(|p| p.line_offset).collect();
        // "a\nb" | "c" | "" | "d"
        assert_eq!(offsets, vec![0, 3, 5, 7]);
    }

    #[test]
    fn test_exact_line_ranges() {
        // lines 10..=17
        let content = "### Leaf\nline one\n\npara two a\npara two b\n\npara three\nend";
        let chunk = make_chunk(content, 10);
        assert_eq!(chunk.end_line, 17);

        let out = subdivide(vec![chunk], 25);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].content, "### Leaf\nline one");
        assert_eq!((out[0].start_line, out[0].end_line), (10, 12));
        assert_eq!(out[1].content, "para two a\npara two b");
        assert_eq!((out[1].start_line, out[1].end_line), (13, 15));
        assert_eq!(out[2].content, "para three\nend");
        assert_eq!((out[2].start_line, out[2].end_line), (16, 17));
    }

    #[test]
    fn test_separator_counts_toward_budget() {
        // Two 5-char paragraphs: 10 chars without the separator, 12 with it
        let chunk = make_chunk("aaaaa\n\nbbbbb\n\ncc", 0);
        let out = subdivide(vec![chunk], 11);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].content, "aaaaa");
        assert_eq!(out[1].content, "bbbbb\n\ncc");
    }

    #[test]
    fn test_oversized_single_paragraph_kept_whole() {
        let long = "x".repeat(50);
        let content = format!("{}\n\nshort", long);
        let out = subdivide(vec![make_chunk(&content, 0)], 10);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].content, long);
        assert_eq!(out[1].content, "short");
    }

    #[test]
    fn test_sub_chunks_keep_hierarchy() {
        let content = vec!["p".repeat(20); 6].join("\n\n");
        let out = subdivide(vec![make_chunk(&content, 3)], 45);

        assert!(out.len() > 1);
        for sub in &out {
            assert_eq!(sub.header_path, vec!["Top", "Leaf"]);
            assert_eq!(sub.level, 3);
            assert_eq!(sub.ancestry().len(), 2);
        }
    }

    #[test]
    fn test_no_content_lost() {
        let content = "alpha\n\nbeta beta\n\n\n\ngamma\n\ndelta delta delta";
        let out = subdivide(vec![make_chunk(content, 0)], 12);

        let rejoined = out
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join(PARAGRAPH_SEPARATOR);
        assert_eq!(rejoined, content);
    }

    #[test]
    fn test_budget_counts_chars_not_bytes() {
        // 4 chars, 8 bytes each
        let chunk = make_chunk("éééé\n\nüüüü", 0);
        let out = subdivide(vec![chunk], 10);
        assert_eq!(out.len(), 1);
    }
}
