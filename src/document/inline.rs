//! Inline emphasis spans (`**bold**`)

use smallvec::SmallVec;

const BOLD_DELIMITER: &str = "**";

/// A run of visible text with uniform emphasis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineSpan<'a> {
    pub text: &'a str,
    pub bold: bool,
}

/// Spans of one block, most blocks have at most a handful
pub type InlineSpans<'a> = SmallVec<[InlineSpan<'a>; 4]>;

/// Split `text` into plain and bold spans.
///
/// A bold span is `**` + one or more characters other than `*` + `**`.
/// Anything that does not close stays plain, markers included.
pub fn parse_inline(text: &str) -> InlineSpans<'_> {
    let mut spans = InlineSpans::new();
    let mut plain_start = 0;
    let mut cursor = 0;

    while let Some(found) = text[cursor..].find(BOLD_DELIMITER) {
        let open = cursor + found;
        let inner_start = open + BOLD_DELIMITER.len();
        let inner_len = text[inner_start..]
            .find('*')
            .unwrap_or(text.len() - inner_start);

        let closes = inner_len > 0 && text[inner_start + inner_len..].starts_with(BOLD_DELIMITER);
        if !closes {
            cursor = open + 1;
            continue;
        }

        if open > plain_start {
            spans.push(InlineSpan {
                text: &text[plain_start..open],
                bold: false,
            });
        }
        spans.push(InlineSpan {
            text: &text[inner_start..inner_start + inner_len],
            bold: true,
        });

        cursor = inner_start + inner_len + BOLD_DELIMITER.len();
        plain_start = cursor;
    }

    if plain_start < text.len() {
        spans.push(InlineSpan {
            text: &text[plain_start..],
            bold: false,
        });
    }
    spans
}

/// Visible text with emphasis markers removed
pub fn visible_text(text: &str) -> String {
    parse_inline(text).iter().map(|span| span.text).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold_texts<'a>(spans: &InlineSpans<'a>) -> Vec<&'a str> {
        spans.iter().filter(|s| s.bold).map(|s| s.text).collect()
    }

    #[test]
    fn test_plain_text() {
        let spans = parse_inline("no emphasis here");
        assert_eq!(spans.len(), 1);
        assert!(!spans[0].bold);
    }

    #[test]
    fn test_bold_span() {
        let spans = parse_inline("love is **a mirror** of self");
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].text, "love is ");
        assert_eq!(spans[1], InlineSpan { text: "a mirror", bold: true });
        assert_eq!(spans[2].text, " of self");
    }

    #[test]
    fn test_multiple_and_adjacent_spans() {
        let spans = parse_inline("**one****two** three");
        assert_eq!(bold_texts(&spans), vec!["one", "two"]);
        assert_eq!(visible_text("**one****two** three"), "onetwo three");
    }

    #[test]
    fn test_unclosed_markers_stay_visible() {
        assert_eq!(visible_text("a ** b"), "a ** b");
        assert_eq!(visible_text("**"), "**");
        assert_eq!(visible_text("****"), "****");
        assert_eq!(visible_text("2 * 3 = **6"), "2 * 3 = **6");
    }

    #[test]
    fn test_star_inside_is_not_bold() {
        let spans = parse_inline("**a*b** tail");
        assert!(bold_texts(&spans).is_empty());
    }

    #[test]
    fn test_cjk_bold() {
        let spans = parse_inline("所谓成长，**就是接纳自己**。");
        assert_eq!(bold_texts(&spans), vec!["就是接纳自己"]);
        assert_eq!(visible_text("所谓成长，**就是接纳自己**。"), "所谓成长，就是接纳自己。");
    }
}
