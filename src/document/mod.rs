//! Document model: the blank-free line sequence of one pagination run

mod block;
mod inline;

pub use block::{BlockKind, PRIMARY_HEADING_MARKER, QUOTE_MARKER, SECONDARY_HEADING_MARKER};
pub use inline::{parse_inline, visible_text, InlineSpan, InlineSpans};

/// One non-blank line of input together with its derived kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub text: &'a str,
    pub kind: BlockKind,
}

impl<'a> Line<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            kind: BlockKind::classify(text),
        }
    }
}

/// Immutable input to one pagination run.
///
/// Lines borrow from the source text; blank and whitespace-only lines are
/// dropped at construction and never reach the engine.
#[derive(Debug, Clone, Default)]
pub struct Document<'a> {
    lines: Vec<&'a str>,
}

impl<'a> Document<'a> {
    /// Split `text` on line feeds, tolerating CRLF line endings
    pub fn from_text(text: &'a str) -> Self {
        let lines = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.trim().is_empty())
            .collect();
        Self { lines }
    }

    /// Get line count
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the document has nothing to place
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Raw lines in input order
    pub fn raw_lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// Classified lines in input order
    pub fn lines(&self) -> impl Iterator<Item = Line<'a>> + '_ {
        self.lines.iter().copied().map(Line::new)
    }

    /// Total characters of non-blank content
    pub fn char_count(&self) -> usize {
        self.lines.iter().map(|line| line.chars().count()).sum()
    }
}
