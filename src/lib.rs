//! Card Pager: height-budgeted pagination of marked-up text into cards
//!
//! This crate provides the core of a card generator:
//! - Line classification into headings, quotes and paragraphs
//! - A measurement oracle contract and a text-metrics layout surface
//! - Greedy pagination with atomic blocks and boundary-aware paragraph splits
//! - Display lists for fixed-size 375x500 cards in two templates

pub mod document;
pub mod error;
pub mod layout;
pub mod render;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmPager;

// Re-export primary types
pub use document::{BlockKind, Document};
pub use error::{ConfigError, MeasureError, PaginateError, StyleError};
pub use layout::{
    CardTemplate, FixedCostMeasure, LayoutSurface, Measure, MeasureFn, Page, PageBreak,
    PageBudget, PageRole, PaginationRules, Paginator, StyleSheet,
};
pub use render::{CardDisplay, DisplayItem, Renderer};

use layout::FontMetrics;

/// Card coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Card rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// A template's renderer together with the splitting rules.
///
/// Every call to [`CardPager::paginate`] lays out on a fresh
/// [`LayoutSurface`] bound to the same renderer that later draws the cards.
#[derive(Debug, Clone)]
pub struct CardPager {
    renderer: Renderer,
    rules: PaginationRules,
}

impl Default for CardPager {
    fn default() -> Self {
        Self::new(CardTemplate::default())
    }
}

impl CardPager {
    /// Create a pager for a built-in template with default rules
    pub fn new(template: CardTemplate) -> Self {
        Self::with_style_sheet(template.style_sheet())
    }

    pub fn with_style_sheet(sheet: StyleSheet) -> Self {
        Self {
            renderer: Renderer::new(sheet),
            rules: PaginationRules::default(),
        }
    }

    /// Swap the glyph advance tables
    pub fn with_metrics(self, metrics: FontMetrics) -> Self {
        Self {
            renderer: Renderer::with_metrics(self.renderer.style_sheet().clone(), metrics),
            rules: self.rules,
        }
    }

    pub fn with_rules(mut self, rules: PaginationRules) -> Result<Self, ConfigError> {
        rules.validate()?;
        self.rules = rules;
        Ok(self)
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn style_sheet(&self) -> &StyleSheet {
        self.renderer.style_sheet()
    }

    pub fn rules(&self) -> &PaginationRules {
        &self.rules
    }

    pub fn budget(&self) -> PageBudget {
        self.style_sheet().budget()
    }

    /// Paginate against the built-in layout surface
    pub fn paginate(&self, text: &str) -> error::Result<Vec<Page>> {
        self.paginate_with(LayoutSurface::new(&self.renderer), text)
    }

    /// Paginate against an external oracle, using this pager's budget and rules
    pub fn paginate_with<M: Measure>(&self, oracle: M, text: &str) -> error::Result<Vec<Page>> {
        let mut paginator = Paginator::new(oracle, self.budget(), self.rules.clone())?;
        paginator.paginate(text)
    }

    /// Lay out one page as a card of a deck of `total`
    pub fn render(&self, page: &Page, total: usize) -> CardDisplay {
        self.renderer.render_card(&page.line_refs(), page.index, total)
    }

    pub fn render_all(&self, pages: &[Page]) -> Vec<CardDisplay> {
        pages.iter().map(|page| self.render(page, pages.len())).collect()
    }
}
