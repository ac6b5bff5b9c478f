//! The measurement oracle contract
//!
//! Pagination never computes sizes itself. It asks an oracle for the rendered
//! content height of a candidate page and compares it with the page budget.
//! Oracles take `&mut self`: a surface is laid out anew on every probe, so
//! probes against one oracle are serialized by construction and each run
//! owns its own surface.

use crate::document::BlockKind;
use crate::error::MeasureError;

/// Reports the rendered content height of a candidate page
pub trait Measure {
    /// Lay out `lines` as the renderer would for the given page position and
    /// return the content height in pixels
    fn measure(&mut self, lines: &[&str], first_page: bool) -> Result<f32, MeasureError>;
}

impl<M: Measure + ?Sized> Measure for Box<M> {
    fn measure(&mut self, lines: &[&str], first_page: bool) -> Result<f32, MeasureError> {
        (**self).measure(lines, first_page)
    }
}

impl<M: Measure + ?Sized> Measure for &mut M {
    fn measure(&mut self, lines: &[&str], first_page: bool) -> Result<f32, MeasureError> {
        (**self).measure(lines, first_page)
    }
}

/// Adapter turning an infallible closure into an oracle
pub struct MeasureFn<F>(pub F);

impl<F> Measure for MeasureFn<F>
where
    F: FnMut(&[&str], bool) -> f32,
{
    fn measure(&mut self, lines: &[&str], first_page: bool) -> Result<f32, MeasureError> {
        Ok((self.0)(lines, first_page))
    }
}

/// Reject heights no layout could produce
pub fn check_height(height: f32) -> Result<f32, MeasureError> {
    if height.is_finite() && height >= 0.0 {
        Ok(height)
    } else {
        Err(MeasureError::InvalidHeight(height))
    }
}

/// Per-kind fixed cost of a block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindCosts {
    pub primary_heading: f32,
    pub secondary_heading: f32,
    pub quote: f32,
    pub paragraph: f32,
}

impl KindCosts {
    pub fn uniform(cost: f32) -> Self {
        Self {
            primary_heading: cost,
            secondary_heading: cost,
            quote: cost,
            paragraph: cost,
        }
    }

    pub fn get(&self, kind: BlockKind) -> f32 {
        match kind {
            BlockKind::PrimaryHeading => self.primary_heading,
            BlockKind::SecondaryHeading => self.secondary_heading,
            BlockKind::Quote => self.quote,
            BlockKind::Paragraph => self.paragraph,
        }
    }
}

/// Deterministic synthetic oracle.
///
/// Height of a page is the sum over its lines of the line's kind cost plus
/// `per_char` for every character. No rendering environment is needed, which
/// makes it the oracle of choice for tests and benchmarks.
#[derive(Debug, Clone)]
pub struct FixedCostMeasure {
    pub costs: KindCosts,
    pub per_char: f32,
    /// Extra height added once on the first page
    pub first_page_extra: f32,
    probes: usize,
}

impl FixedCostMeasure {
    pub fn new(costs: KindCosts, per_char: f32) -> Self {
        Self {
            costs,
            per_char,
            first_page_extra: 0.0,
            probes: 0,
        }
    }

    pub fn with_first_page_extra(mut self, extra: f32) -> Self {
        self.first_page_extra = extra;
        self
    }

    /// Height of a single line, independent of its neighbours
    pub fn line_height(&self, line: &str) -> f32 {
        self.costs.get(BlockKind::classify(line)) + self.per_char * line.chars().count() as f32
    }

    /// Number of probes answered so far
    pub fn probes(&self) -> usize {
        self.probes
    }
}

impl Measure for FixedCostMeasure {
    fn measure(&mut self, lines: &[&str], first_page: bool) -> Result<f32, MeasureError> {
        self.probes += 1;
        let extra = if first_page { self.first_page_extra } else { 0.0 };
        let height: f32 = lines.iter().map(|line| self.line_height(line)).sum();
        check_height(height + extra)
    }
}
