//! Block rendering and card display lists
//!
//! [`Renderer::render_block`] is the one place where a raw line becomes a
//! sized visual fragment. The measurement surface stacks these fragments to
//! answer height probes and [`Renderer::render_card`] positions the very same
//! fragments on a card, so pagination and drawing cannot disagree.

use crate::document::{parse_inline, BlockKind};
use crate::layout::font::{FontMetrics, FontWeight};
use crate::layout::line_break::{LineBreaker, Lines};
use crate::layout::pagination::PageRole;
use crate::layout::style::StyleSheet;
use crate::{Point, Rect};
use smallvec::SmallVec;
use std::ops::Range;

/// Byte ranges of bold text
pub type Emphasis = SmallVec<[Range<usize>; 2]>;

/// One rendered block: visible text, wrapped lines, stacked height
#[derive(Debug, Clone, PartialEq)]
pub struct BlockFragment {
    pub kind: BlockKind,
    /// Text with markup removed
    pub text: String,
    /// Bold ranges within `text`
    pub bold: Emphasis,
    pub lines: Lines,
    /// Height including margins, padding and divider
    pub height: f32,
}

/// A display item to draw
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayItem {
    /// Decorative bar above the content
    AccentBar { rect: Rect, color: String },
    /// One wrapped line of a block
    TextRun {
        position: Point,
        text: String,
        kind: BlockKind,
        font_size: f32,
        weight: FontWeight,
        italic: bool,
        color: String,
        /// Bold ranges within `text`
        emphasis: Emphasis,
        emphasis_color: String,
        width: f32,
    },
    /// Left rule of a quote
    Border { rect: Rect, color: String },
    /// Rule under a heading
    Divider { rect: Rect, color: String },
    /// `n / total` footer
    PageNumber {
        position: Point,
        text: String,
        font_size: f32,
        color: String,
    },
}

/// Display list for a single card
#[derive(Debug, Clone, PartialEq)]
pub struct CardDisplay {
    pub index: usize,
    pub role: PageRole,
    pub bounds: Rect,
    pub background: String,
    pub items: Vec<DisplayItem>,
    /// Stacked height of the blocks
    pub content_height: f32,
    /// Height available to the blocks
    pub budget: f32,
}

impl CardDisplay {
    /// Content taller than the card's budget (a lone oversized block)
    pub fn overflows(&self) -> bool {
        self.content_height > self.budget
    }

    /// Text runs in drawing order
    pub fn text_runs(&self) -> impl Iterator<Item = &DisplayItem> {
        self.items
            .iter()
            .filter(|item| matches!(item, DisplayItem::TextRun { .. }))
    }
}

/// Turns lines into fragments and pages into cards for one style sheet
#[derive(Debug, Clone)]
pub struct Renderer {
    sheet: StyleSheet,
    metrics: FontMetrics,
    breaker: LineBreaker,
}

impl Renderer {
    pub fn new(sheet: StyleSheet) -> Self {
        Self::with_metrics(sheet, FontMetrics::default())
    }

    pub fn with_metrics(sheet: StyleSheet, metrics: FontMetrics) -> Self {
        Self {
            sheet,
            metrics,
            breaker: LineBreaker::new(),
        }
    }

    pub fn style_sheet(&self) -> &StyleSheet {
        &self.sheet
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// Classify, strip markup and wrap one raw line
    pub fn render_block(&self, line: &str, first_page: bool) -> BlockFragment {
        let kind = BlockKind::classify(line);
        let style = self.sheet.block(kind, first_page);
        let body = kind.strip_marker(line);

        let mut text = String::with_capacity(body.len());
        let mut bold = Emphasis::new();
        if kind.has_inline_markup() {
            for span in parse_inline(body) {
                let start = text.len();
                text.push_str(span.text);
                if span.bold {
                    bold.push(start..text.len());
                }
            }
        } else {
            text.push_str(body);
        }

        let max_width = self.sheet.geometry.content_width() - style.inset_left();
        let lines = self
            .breaker
            .wrap(&text, &bold, style, max_width, &self.metrics);
        let height = lines.len() as f32 * style.line_px() + style.vertical_chrome();

        BlockFragment {
            kind,
            text,
            bold,
            lines,
            height,
        }
    }

    /// Position the lines of page `index` (of `total`) on a card
    pub fn render_card(&self, lines: &[&str], index: usize, total: usize) -> CardDisplay {
        let first_page = index == 0;
        let geometry = &self.sheet.geometry;
        let decoration = &self.sheet.decoration;
        let insets = geometry.insets(first_page);
        let mut items = Vec::new();

        if let Some(bar) = &decoration.accent_bar {
            items.push(DisplayItem::AccentBar {
                rect: Rect::new(
                    geometry.padding_left,
                    insets.top - bar.gap_below - bar.height,
                    bar.width,
                    bar.height,
                ),
                color: bar.color.clone(),
            });
        }

        let mut y = insets.top;
        let mut content_height = 0.0;
        for line in lines {
            let fragment = self.render_block(line, first_page);
            let style = self.sheet.block(fragment.kind, first_page);
            let line_px = style.line_px();
            let block_top = y + style.margin_top;
            let text_top = block_top + style.padding_y;
            let text_height = fragment.lines.len() as f32 * line_px;
            let x = geometry.padding_left + style.inset_left();

            if let Some(border) = &style.border_left {
                items.push(DisplayItem::Border {
                    rect: Rect::new(
                        geometry.padding_left,
                        block_top,
                        border.width,
                        text_height + style.padding_y * 2.0,
                    ),
                    color: border.color.clone(),
                });
            }

            for (row, layout) in fragment.lines.iter().enumerate() {
                let range = layout.byte_range.clone();
                let emphasis = fragment
                    .bold
                    .iter()
                    .filter_map(|bold| {
                        let start = bold.start.max(range.start);
                        let end = bold.end.min(range.end);
                        (start < end).then(|| start - range.start..end - range.start)
                    })
                    .collect();

                items.push(DisplayItem::TextRun {
                    position: Point {
                        x,
                        y: text_top + row as f32 * line_px,
                    },
                    text: fragment.text[range].to_string(),
                    kind: fragment.kind,
                    font_size: style.font_size,
                    weight: style.weight,
                    italic: style.italic,
                    color: style.color.clone(),
                    emphasis,
                    emphasis_color: style.emphasis_color.clone(),
                    width: layout.width,
                });
            }

            if let Some(divider) = &style.divider {
                let text_bottom = text_top + text_height + style.padding_y;
                items.push(DisplayItem::Divider {
                    rect: Rect::new(
                        geometry.padding_left,
                        text_bottom + style.margin_bottom,
                        geometry.content_width(),
                        divider.thickness,
                    ),
                    color: divider.color.clone(),
                });
            }

            y += fragment.height;
            content_height += fragment.height;
        }

        if decoration.page_number && !first_page {
            items.push(DisplayItem::PageNumber {
                position: Point {
                    x: geometry.width - geometry.padding_right,
                    y: geometry.height - 12.0 - decoration.page_number_size,
                },
                text: format!("{} / {}", index + 1, total),
                font_size: decoration.page_number_size,
                color: decoration.page_number_color.clone(),
            });
        }

        CardDisplay {
            index,
            role: PageRole::for_index(index, total),
            bounds: Rect::new(0.0, 0.0, geometry.width, geometry.height),
            background: decoration.background.clone(),
            items,
            content_height,
            budget: geometry.content_height(first_page),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_block_strips_markup() {
        let renderer = Renderer::new(StyleSheet::deep());
        let heading = renderer.render_block("## Section One", false);
        assert_eq!(heading.kind, BlockKind::SecondaryHeading);
        assert_eq!(heading.text, "Section One");
        assert!(heading.bold.is_empty());

        let para = renderer.render_block("a **bold** claim", false);
        assert_eq!(para.text, "a bold claim");
        assert_eq!(para.bold.as_slice(), &[2..6]);
    }

    #[test]
    fn test_headings_keep_stars() {
        let renderer = Renderer::new(StyleSheet::deep());
        let heading = renderer.render_block("# **Loud** title", true);
        assert_eq!(heading.text, "**Loud** title");
    }

    #[test]
    fn test_card_positions_follow_fragment_heights() {
        let renderer = Renderer::new(StyleSheet::deep());
        let card = renderer.render_card(&["## Section One", "Short intro."], 1, 3);
        let tops: Vec<f32> = card
            .text_runs()
            .map(|item| match item {
                DisplayItem::TextRun { position, .. } => position.y,
                _ => unreachable!(),
            })
            .collect();
        // interior content starts at 54; heading has 24 above, 27 tall, 12 below
        assert_eq!(tops, vec![54.0 + 24.0, 54.0 + 24.0 + 27.0 + 12.0]);
        assert_eq!(card.role, PageRole::Body);
        assert!(!card.overflows());
        assert!(matches!(card.items[0], DisplayItem::AccentBar { .. }));
    }

    #[test]
    fn test_accent_bar_sits_above_content() {
        let renderer = Renderer::new(StyleSheet::deep());
        let card = renderer.render_card(&["# Title"], 0, 1);
        match &card.items[0] {
            DisplayItem::AccentBar { rect, .. } => {
                assert_eq!(rect.y, 70.0 - 8.0 - 6.0);
                assert_eq!(rect.x, 32.0);
            }
            other => panic!("unexpected item {:?}", other),
        }
    }

    #[test]
    fn test_classic_footer_and_divider() {
        let renderer = Renderer::new(StyleSheet::classic());
        let cover = renderer.render_card(&["# Title"], 0, 2);
        assert!(cover
            .items
            .iter()
            .any(|item| matches!(item, DisplayItem::Divider { .. })));
        assert!(!cover
            .items
            .iter()
            .any(|item| matches!(item, DisplayItem::PageNumber { .. })));

        let last = renderer.render_card(&["Body"], 1, 2);
        assert_eq!(last.role, PageRole::Closing);
        let footer = last.items.iter().find_map(|item| match item {
            DisplayItem::PageNumber { text, .. } => Some(text.clone()),
            _ => None,
        });
        assert_eq!(footer.as_deref(), Some("2 / 2"));
    }

    #[test]
    fn test_emphasis_split_across_wrapped_lines() {
        let renderer = Renderer::new(StyleSheet::deep());
        let bold = format!("plain **{}** end", "strong ".repeat(30));
        let card = renderer.render_card(&[bold.as_str()], 1, 2);
        let emphasized = card
            .text_runs()
            .filter(|item| matches!(item, DisplayItem::TextRun { emphasis, .. } if !emphasis.is_empty()))
            .count();
        assert!(emphasized >= 2);
    }
}
