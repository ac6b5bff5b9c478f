//! Block-level classification of marked-up lines

use serde::Serialize;

/// Marker that opens a primary heading
pub const PRIMARY_HEADING_MARKER: &str = "# ";
/// Marker that opens a secondary heading
pub const SECONDARY_HEADING_MARKER: &str = "## ";
/// Marker that opens a block quote
pub const QUOTE_MARKER: &str = "> ";

/// The structural role of one line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    /// Card title
    PrimaryHeading,
    /// Section title
    SecondaryHeading,
    /// Block quote
    Quote,
    /// Anything else, inline emphasis included
    #[default]
    Paragraph,
}

impl BlockKind {
    /// Classify a raw line by the markup it starts with.
    ///
    /// An indented marker is plain text: `"  ## x"` is a paragraph.
    pub fn classify(line: &str) -> Self {
        if line.starts_with(SECONDARY_HEADING_MARKER) {
            BlockKind::SecondaryHeading
        } else if line.starts_with(PRIMARY_HEADING_MARKER) {
            BlockKind::PrimaryHeading
        } else if line.starts_with(QUOTE_MARKER) {
            BlockKind::Quote
        } else {
            BlockKind::Paragraph
        }
    }

    /// Length in bytes of the markup prefix for this kind
    pub fn marker_len(&self) -> usize {
        match self {
            BlockKind::PrimaryHeading => PRIMARY_HEADING_MARKER.len(),
            BlockKind::SecondaryHeading => SECONDARY_HEADING_MARKER.len(),
            BlockKind::Quote => QUOTE_MARKER.len(),
            BlockKind::Paragraph => 0,
        }
    }

    /// Strip the markup prefix and surrounding whitespace, leaving visible text
    pub fn strip_marker<'a>(&self, line: &'a str) -> &'a str {
        line.get(self.marker_len()..).unwrap_or("").trim()
    }

    /// Atomic blocks are never split across pages
    pub fn is_atomic(&self) -> bool {
        !matches!(self, BlockKind::Paragraph)
    }

    /// Check if this is a heading
    pub fn is_heading(&self) -> bool {
        matches!(self, BlockKind::PrimaryHeading | BlockKind::SecondaryHeading)
    }

    /// Whether inline `**bold**` spans are resolved for this kind
    pub fn has_inline_markup(&self) -> bool {
        matches!(self, BlockKind::Quote | BlockKind::Paragraph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(BlockKind::classify("# Title"), BlockKind::PrimaryHeading);
        assert_eq!(BlockKind::classify("## Section One"), BlockKind::SecondaryHeading);
        assert_eq!(BlockKind::classify("> quote — Author"), BlockKind::Quote);
        assert_eq!(BlockKind::classify("Short intro."), BlockKind::Paragraph);
        assert_eq!(BlockKind::classify("a **bold** claim"), BlockKind::Paragraph);
    }

    #[test]
    fn test_markers_need_trailing_space() {
        assert_eq!(BlockKind::classify("#hashtag"), BlockKind::Paragraph);
        assert_eq!(BlockKind::classify("##"), BlockKind::Paragraph);
        assert_eq!(BlockKind::classify(">quoted"), BlockKind::Paragraph);
        assert_eq!(BlockKind::classify("### Deeper"), BlockKind::Paragraph);
    }

    #[test]
    fn test_indented_marker_is_paragraph() {
        assert_eq!(BlockKind::classify("   ## Indented"), BlockKind::Paragraph);
        assert_eq!(BlockKind::classify(" > not a quote"), BlockKind::Paragraph);
        assert_eq!(BlockKind::classify("\t# tabbed"), BlockKind::Paragraph);
    }

    #[test]
    fn test_strip_marker() {
        let kind = BlockKind::classify("## Section One");
        assert_eq!(kind.strip_marker("## Section One"), "Section One");
        assert_eq!(BlockKind::Quote.strip_marker(">  wise words "), "wise words");
        assert_eq!(BlockKind::Paragraph.strip_marker("  ## plain "), "## plain");
    }

    #[test]
    fn test_atomicity() {
        assert!(BlockKind::PrimaryHeading.is_atomic());
        assert!(BlockKind::SecondaryHeading.is_atomic());
        assert!(BlockKind::Quote.is_atomic());
        assert!(!BlockKind::Paragraph.is_atomic());
        assert!(!BlockKind::Quote.is_heading());
    }
}
