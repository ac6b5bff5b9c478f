//! Font metrics for layout
//!
//! Advances are stored in em units and scaled by the font size of the block
//! being laid out, so one table serves every block style on a card.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Weight of a block's glyphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
    ExtraBold,
}

/// Metrics needed for text layout
#[derive(Debug, Clone)]
pub struct FontMetrics {
    /// Advance of ASCII characters (0-127), in em
    pub char_widths: Vec<f32>,
    /// Advance of characters with no other entry, in em
    pub default_width: f32,
    /// Advance of East Asian wide characters, in em
    pub wide_width: f32,
    /// Advance overrides for individual non-ASCII characters, in em
    pub overrides: FxHashMap<char, f32>,
    /// Horizontal growth of bold glyphs
    pub bold_scale: f32,
    /// Horizontal growth of extra-bold glyphs
    pub extra_bold_scale: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        // Proportional serif approximation
        let mut char_widths = vec![0.0; 128];
        for c in 0u8..128 {
            char_widths[c as usize] = match c {
                b' ' => 0.25,
                b'i' | b'j' | b'l' | b'\'' | b'|' | b'!' | b'.' | b',' | b':' | b';' => 0.28,
                b'f' | b't' | b'r' | b'I' | b'(' | b')' | b'[' | b']' | b'"' | b'-' => 0.34,
                b'm' | b'w' => 0.75,
                b'M' | b'W' => 0.88,
                b'A'..=b'Z' => 0.66,
                b'a'..=b'z' | b'0'..=b'9' => 0.5,
                0..=31 | 127 => 0.0,
                _ => 0.55,
            };
        }

        let mut overrides = FxHashMap::default();
        // Typographic punctuation common in generated copy
        for (c, w) in [('—', 1.0), ('–', 0.5), ('“', 0.44), ('”', 0.44), ('‘', 0.28), ('’', 0.28), ('…', 1.0)] {
            overrides.insert(c, w);
        }

        Self {
            char_widths,
            default_width: 0.55,
            wide_width: 1.0,
            overrides,
            bold_scale: 1.05,
            extra_bold_scale: 1.08,
        }
    }
}

impl FontMetrics {
    /// Monospace metrics, every glyph one em wide
    pub fn monospace() -> Self {
        Self {
            char_widths: vec![1.0; 128],
            default_width: 1.0,
            wide_width: 1.0,
            overrides: FxHashMap::default(),
            bold_scale: 1.0,
            extra_bold_scale: 1.0,
        }
    }

    /// Get advance of a character, in em
    pub fn width(&self, c: char) -> f32 {
        if c.is_ascii() {
            if let Some(w) = self.char_widths.get(c as usize) {
                return *w;
            }
        }
        if let Some(w) = self.overrides.get(&c) {
            return *w;
        }
        if is_wide(c) {
            return self.wide_width;
        }
        self.default_width
    }

    /// Advance of `text` in pixels at `font_size`
    pub fn advance(&self, text: &str, font_size: f32, weight: FontWeight) -> f32 {
        let em: f32 = text.chars().map(|c| self.width(c)).sum();
        em * font_size * self.weight_scale(weight)
    }

    pub fn weight_scale(&self, weight: FontWeight) -> f32 {
        match weight {
            FontWeight::Normal => 1.0,
            FontWeight::Bold => self.bold_scale,
            FontWeight::ExtraBold => self.extra_bold_scale,
        }
    }
}

/// East Asian wide and fullwidth ranges (CJK, kana, hangul, fullwidth forms, emoji)
fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F
        | 0x2E80..=0x303E
        | 0x3041..=0x33FF
        | 0x3400..=0x4DBF
        | 0x4E00..=0x9FFF
        | 0xA000..=0xA4CF
        | 0xAC00..=0xD7A3
        | 0xF900..=0xFAFF
        | 0xFE30..=0xFE4F
        | 0xFF00..=0xFF60
        | 0xFFE0..=0xFFE6
        | 0x1F300..=0x1F64F
        | 0x1F900..=0x1F9FF
        | 0x20000..=0x2FFFD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_widths() {
        let metrics = FontMetrics::default();
        assert_eq!(metrics.width(' '), 0.25);
        assert!(metrics.width('m') > metrics.width('i'));
        assert_eq!(metrics.width('\n'), 0.0);
    }

    #[test]
    fn test_wide_characters() {
        let metrics = FontMetrics::default();
        assert_eq!(metrics.width('成'), 1.0);
        assert_eq!(metrics.width('，'), 1.0);
        assert_eq!(metrics.width('é'), metrics.default_width);
        assert_eq!(metrics.width('—'), 1.0);
    }

    #[test]
    fn test_advance_scales_with_size_and_weight() {
        let metrics = FontMetrics::monospace();
        assert_eq!(metrics.advance("abcd", 10.0, FontWeight::Normal), 40.0);

        let metrics = FontMetrics::default();
        let normal = metrics.advance("成长", 13.0, FontWeight::Normal);
        let bold = metrics.advance("成长", 13.0, FontWeight::Bold);
        assert_eq!(normal, 26.0);
        assert!(bold > normal);
    }
}
