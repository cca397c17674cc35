use serde::{Deserialize, Serialize};

/// Deepest ATX heading level recognised
pub const MAX_HEADER_LEVEL: usize = 6;

/// One entry of the open-section stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderFrame {
    /// Heading level (1..=6)
    pub level: usize,
    /// Heading text, trimmed
    pub title: String,
}

impl HeaderFrame {
    pub fn new(level: usize, title: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
        }
    }
}

/// Classify a line as an ATX heading.
///
/// A heading is 1-6 `#` characters, at least one whitespace character, then a
/// title that is non-empty once trimmed. Anything else is ordinary content,
/// including seven or more hashes and headings with a blank title.
pub fn parse_header_line(line: &str) -> Option<HeaderFrame> {
    let level = line.bytes().take_while(|&b| b == b'#').count();
    if level == 0 || level > MAX_HEADER_LEVEL {
        return None;
    }

    // `#` is ASCII so the byte index is a char boundary
    let rest = &line[level..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }

    let title = rest.trim();
    if title.is_empty() {
        return None;
    }

    Some(HeaderFrame::new(level, title))
}

/// Stack of currently open headings, outermost at the bottom.
///
/// Levels strictly increase from bottom to top.
#[derive(Debug, Default, Clone)]
pub struct HeaderStack {
    frames: Vec<HeaderFrame>,
}

impl HeaderStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a heading: close every frame at the same or deeper level, then push
    pub fn push(&mut self, frame: HeaderFrame) {
        while self
            .frames
            .last()
            .is_some_and(|top| top.level >= frame.level)
        {
            self.frames.pop();
        }
        self.frames.push(frame);
    }

    /// Copy of the open frames, outermost first
    pub fn snapshot(&self) -> Vec<HeaderFrame> {
        self.frames.clone()
    }
}
