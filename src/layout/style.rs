//! Card templates and per-block-kind style rules
//!
//! A [`StyleSheet`] is the single source of truth for block sizing: the
//! measurement surface and the final card renderer both read it, so a page
//! that fits during pagination also fits on the rendered card.

use crate::document::BlockKind;
use crate::error::{ConfigError, StyleError};
use crate::layout::font::FontWeight;
use crate::layout::pagination::PageBudget;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Named card template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardTemplate {
    /// Warm long-form template, the one long texts are paginated into
    #[default]
    Deep,
    /// White card with page-number footer
    Classic,
}

impl CardTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            CardTemplate::Deep => "deep",
            CardTemplate::Classic => "classic",
        }
    }

    /// Build the style sheet for this template
    pub fn style_sheet(&self) -> StyleSheet {
        match self {
            CardTemplate::Deep => StyleSheet::deep(),
            CardTemplate::Classic => StyleSheet::classic(),
        }
    }
}

impl FromStr for CardTemplate {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deep" | "deep-reading" => Ok(CardTemplate::Deep),
            "classic" => Ok(CardTemplate::Classic),
            _ => Err(ConfigError::UnknownTemplate(s.to_string())),
        }
    }
}

/// Left rule drawn beside a block (quotes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BorderStyle {
    pub width: f32,
    pub color: String,
}

/// Horizontal rule drawn under a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividerStyle {
    pub thickness: f32,
    /// Space between the divider and the next block
    pub gap_after: f32,
    pub color: String,
}

/// Visual rules for one block kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockStyle {
    /// Font size in pixels
    pub font_size: f32,
    /// Line height as a multiple of the font size
    pub line_height: f32,
    /// Extra advance per glyph, in em
    pub letter_spacing: f32,
    pub weight: FontWeight,
    pub italic: bool,
    pub margin_top: f32,
    pub margin_bottom: f32,
    /// Padding above and below the text
    pub padding_y: f32,
    pub padding_left: f32,
    pub border_left: Option<BorderStyle>,
    pub divider: Option<DividerStyle>,
    pub color: String,
    /// Color of `**bold**` spans
    pub emphasis_color: String,
}

impl BlockStyle {
    fn text(font_size: f32, line_height: f32, color: &str) -> Self {
        Self {
            font_size,
            line_height,
            letter_spacing: 0.0,
            weight: FontWeight::Normal,
            italic: false,
            margin_top: 0.0,
            margin_bottom: 0.0,
            padding_y: 0.0,
            padding_left: 0.0,
            border_left: None,
            divider: None,
            color: color.to_string(),
            emphasis_color: color.to_string(),
        }
    }

    /// Height of one wrapped line
    pub fn line_px(&self) -> f32 {
        self.font_size * self.line_height
    }

    /// Horizontal space taken before the text starts
    pub fn inset_left(&self) -> f32 {
        self.padding_left + self.border_left.as_ref().map_or(0.0, |b| b.width)
    }

    /// Vertical space around the text lines, margins and divider included
    pub fn vertical_chrome(&self) -> f32 {
        let divider = self
            .divider
            .as_ref()
            .map_or(0.0, |d| d.thickness + d.gap_after);
        self.margin_top + self.padding_y * 2.0 + self.margin_bottom + divider
    }
}

/// Styles for every block kind on one page position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindStyles {
    pub primary_heading: BlockStyle,
    pub secondary_heading: BlockStyle,
    pub quote: BlockStyle,
    pub paragraph: BlockStyle,
}

impl KindStyles {
    pub fn get(&self, kind: BlockKind) -> &BlockStyle {
        match kind {
            BlockKind::PrimaryHeading => &self.primary_heading,
            BlockKind::SecondaryHeading => &self.secondary_heading,
            BlockKind::Quote => &self.quote,
            BlockKind::Paragraph => &self.paragraph,
        }
    }
}

/// Vertical space reserved above and below the content box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Insets {
    pub top: f32,
    pub bottom: f32,
}

/// Card dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardGeometry {
    pub width: f32,
    pub height: f32,
    pub padding_left: f32,
    pub padding_right: f32,
    pub cover: Insets,
    pub interior: Insets,
}

impl CardGeometry {
    /// Get usable content width
    pub fn content_width(&self) -> f32 {
        self.width - self.padding_left - self.padding_right
    }

    pub fn insets(&self, first_page: bool) -> Insets {
        if first_page {
            self.cover
        } else {
            self.interior
        }
    }

    /// Get usable content height for a page position
    pub fn content_height(&self, first_page: bool) -> f32 {
        let insets = self.insets(first_page);
        self.height - insets.top - insets.bottom
    }
}

/// Short bar drawn above the content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccentBar {
    pub width: f32,
    pub height: f32,
    /// Gap between the bar and the first block
    pub gap_below: f32,
    pub color: String,
}

/// Card-level ornaments outside the content box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    pub background: String,
    pub accent_bar: Option<AccentBar>,
    /// Draw `n / total` on interior cards
    pub page_number: bool,
    pub page_number_size: f32,
    pub page_number_color: String,
}

/// Complete visual rules of one template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleSheet {
    pub template: CardTemplate,
    pub geometry: CardGeometry,
    /// Styles on the first page
    pub cover: KindStyles,
    /// Styles on every later page
    pub interior: KindStyles,
    pub decoration: Decoration,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::deep()
    }
}

impl StyleSheet {
    pub fn deep() -> Self {
        let primary_heading = BlockStyle {
            letter_spacing: 0.05,
            weight: FontWeight::ExtraBold,
            margin_bottom: 32.0,
            ..BlockStyle::text(52.0, 1.15, "#8B3A1F")
        };
        let secondary_heading = BlockStyle {
            weight: FontWeight::Bold,
            margin_top: 24.0,
            margin_bottom: 12.0,
            ..BlockStyle::text(18.0, 1.5, "#8B3A1F")
        };
        let quote = BlockStyle {
            italic: true,
            margin_bottom: 20.0,
            padding_y: 2.0,
            padding_left: 20.0,
            border_left: Some(BorderStyle {
                width: 3.0,
                color: "#C8B8A8".into(),
            }),
            emphasis_color: "#5D4037".into(),
            ..BlockStyle::text(13.0, 1.7, "#6D5D52")
        };
        let paragraph = BlockStyle {
            margin_bottom: 8.0,
            emphasis_color: "#5D4037".into(),
            ..BlockStyle::text(13.0, 1.75, "#6B5344")
        };
        let styles = KindStyles {
            primary_heading,
            secondary_heading,
            quote,
            paragraph,
        };

        Self {
            template: CardTemplate::Deep,
            geometry: CardGeometry {
                width: 375.0,
                height: 500.0,
                padding_left: 32.0,
                padding_right: 32.0,
                cover: Insets { top: 70.0, bottom: 4.0 },
                interior: Insets { top: 54.0, bottom: 4.0 },
            },
            cover: styles.clone(),
            interior: styles,
            decoration: Decoration {
                background: "#FAF8F3".into(),
                accent_bar: Some(AccentBar {
                    width: 64.0,
                    height: 6.0,
                    gap_below: 8.0,
                    color: "#D7CCC8".into(),
                }),
                page_number: false,
                page_number_size: 10.0,
                page_number_color: "#9CA3AF".into(),
            },
        }
    }

    pub fn classic() -> Self {
        let heading = BlockStyle {
            letter_spacing: 0.025,
            weight: FontWeight::Bold,
            margin_top: 32.0,
            margin_bottom: 24.0,
            ..BlockStyle::text(30.0, 1.2, "#111827")
        };
        let secondary_heading = BlockStyle {
            letter_spacing: 0.025,
            weight: FontWeight::Bold,
            margin_top: 32.0,
            margin_bottom: 24.0,
            ..BlockStyle::text(20.0, 1.5, "#111827")
        };
        let quote = BlockStyle {
            italic: true,
            margin_bottom: 16.0,
            padding_y: 4.0,
            padding_left: 20.0,
            border_left: Some(BorderStyle {
                width: 3.0,
                color: "#9CA3AF".into(),
            }),
            emphasis_color: "#000000".into(),
            ..BlockStyle::text(14.0, 1.8, "#4B5563")
        };
        let paragraph = BlockStyle {
            letter_spacing: 0.025,
            margin_bottom: 12.0,
            emphasis_color: "#000000".into(),
            ..BlockStyle::text(14.0, 1.8, "#1F2937")
        };

        let interior = KindStyles {
            primary_heading: heading.clone(),
            secondary_heading,
            quote,
            paragraph,
        };
        let cover = KindStyles {
            primary_heading: BlockStyle {
                margin_top: 0.0,
                divider: Some(DividerStyle {
                    thickness: 1.0,
                    gap_after: 24.0,
                    color: "#D1D5DB".into(),
                }),
                ..heading
            },
            ..interior.clone()
        };

        Self {
            template: CardTemplate::Classic,
            geometry: CardGeometry {
                width: 375.0,
                height: 500.0,
                padding_left: 24.0,
                padding_right: 24.0,
                cover: Insets { top: 40.0, bottom: 24.0 },
                interior: Insets { top: 24.0, bottom: 8.0 },
            },
            cover,
            interior,
            decoration: Decoration {
                background: "#FFFFFF".into(),
                accent_bar: None,
                page_number: true,
                page_number_size: 10.0,
                page_number_color: "#9CA3AF".into(),
            },
        }
    }

    /// Style of `kind` for a page position
    pub fn block(&self, kind: BlockKind, first_page: bool) -> &BlockStyle {
        if first_page {
            self.cover.get(kind)
        } else {
            self.interior.get(kind)
        }
    }

    /// Height budgets derived from the card geometry
    pub fn budget(&self) -> PageBudget {
        PageBudget {
            first: self.geometry.content_height(true),
            interior: self.geometry.content_height(false),
        }
    }

    /// Apply a partial JSON object on top of this sheet.
    ///
    /// Only the keys present in `json` change; nested objects merge
    /// field by field.
    pub fn with_overrides(self, json: &str) -> Result<Self, StyleError> {
        let patch: Value = serde_json::from_str(json)?;
        let mut base = serde_json::to_value(&self)?;
        merge_json(&mut base, patch);
        let sheet: StyleSheet = serde_json::from_value(base)?;
        sheet.validate()?;
        Ok(sheet)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let budget = self.budget();
        if self.geometry.content_width() <= 0.0 {
            return Err(ConfigError::InvalidRule("card content width must be positive"));
        }
        budget.validate()
    }
}

/// Recursive object merge, non-object values replace
pub(crate) fn merge_json(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(&key) {
                    Some(slot) => merge_json(slot, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
