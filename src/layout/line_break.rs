//! Line breaking algorithm

use crate::layout::font::{FontMetrics, FontWeight};
use crate::layout::style::BlockStyle;
use smallvec::SmallVec;
use std::ops::Range;
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// Information about a grapheme cluster on the line being filled
#[derive(Debug, Clone)]
struct ClusterInfo {
    byte_offset: usize,
    x: f32,
    width: f32,
    is_space: bool,
}

/// Layout result for a single wrapped line
#[derive(Debug, Clone, PartialEq)]
pub struct LineLayout {
    /// Byte range within the block's visible text
    pub byte_range: Range<usize>,
    /// Ink width, trailing whitespace excluded
    pub width: f32,
}

/// Wrapped lines of one block
pub type Lines = SmallVec<[LineLayout; 4]>;

/// Line breaker
#[derive(Debug, Default, Clone, Copy)]
pub struct LineBreaker;

impl LineBreaker {
    pub fn new() -> Self {
        Self
    }

    /// Wrap visible `text` into lines no wider than `max_width`.
    ///
    /// Breaks fall on Unicode line-break opportunities (after spaces, between
    /// CJK ideographs, ...). Whitespace at the end of a line hangs and never
    /// forces a wrap. A cluster wider than the whole line gets a line of its
    /// own. Empty text produces no lines.
    pub fn wrap(
        &self,
        text: &str,
        bold: &[Range<usize>],
        style: &BlockStyle,
        max_width: f32,
        metrics: &FontMetrics,
    ) -> Lines {
        let mut lines = Lines::new();
        if text.is_empty() {
            return lines;
        }

        let opportunities: Vec<(usize, BreakOpportunity)> = linebreaks(text).collect();
        let mut next_opportunity = 0;

        let tracking = style.letter_spacing * style.font_size;
        let mut line_start = 0;
        let mut x: f32 = 0.0;
        let mut clusters: Vec<ClusterInfo> = Vec::new();
        let mut last_break: Option<usize> = None;

        for (byte_idx, grapheme) in text.grapheme_indices(true) {
            while let Some(&(offset, kind)) = opportunities.get(next_opportunity) {
                if offset > byte_idx {
                    break;
                }
                next_opportunity += 1;
                if offset != byte_idx || offset == line_start {
                    continue;
                }
                match kind {
                    BreakOpportunity::Mandatory => {
                        lines.push(finish_line(line_start..byte_idx, &clusters));
                        clusters.clear();
                        line_start = byte_idx;
                        x = 0.0;
                        last_break = None;
                    }
                    BreakOpportunity::Allowed => last_break = Some(byte_idx),
                }
            }

            let weight = if bold.iter().any(|r| r.contains(&byte_idx)) {
                FontWeight::Bold
            } else {
                style.weight
            };
            let is_space = grapheme.chars().all(char::is_whitespace);
            let width = if grapheme.chars().all(char::is_control) {
                0.0
            } else {
                metrics.advance(grapheme, style.font_size, weight) + tracking
            };

            // Check for soft wrap
            if !is_space && x + width > max_width && !clusters.is_empty() {
                let break_offset = last_break.unwrap_or(byte_idx);
                let split = clusters
                    .iter()
                    .position(|c| c.byte_offset >= break_offset)
                    .unwrap_or(clusters.len());

                lines.push(finish_line(line_start..break_offset, &clusters[..split]));

                // Shift the carried-over clusters to the new line
                let shift = clusters.get(split).map_or(x, |c| c.x);
                clusters.drain(..split);
                for cluster in &mut clusters {
                    cluster.x -= shift;
                }

                line_start = break_offset;
                x -= shift;
                last_break = None;
            }

            clusters.push(ClusterInfo {
                byte_offset: byte_idx,
                x,
                width,
                is_space,
            });
            x += width;
        }

        lines.push(finish_line(line_start..text.len(), &clusters));
        lines
    }
}

fn finish_line(byte_range: Range<usize>, clusters: &[ClusterInfo]) -> LineLayout {
    let width = clusters
        .iter()
        .rev()
        .find(|c| !c.is_space)
        .map_or(0.0, |c| c.x + c.width);
    LineLayout { byte_range, width }
}
