//! Text-metrics layout surface, the production measurement oracle

use crate::error::MeasureError;
use crate::layout::measure::{check_height, Measure};
use crate::render::{BlockFragment, Renderer};

/// A reusable layout surface.
///
/// Every probe replaces the surface contents with a fresh layout of the
/// candidate lines, produced by the same [`Renderer`] that draws the final
/// cards, and reads back the stacked height. Blocks stack without margin
/// collapsing, matching a column flex container.
pub struct LayoutSurface<'r> {
    renderer: &'r Renderer,
    /// Blocks laid out by the last probe
    fragments: Vec<BlockFragment>,
    /// Page position of the last probe
    first_page: bool,
    probes: usize,
}

impl<'r> LayoutSurface<'r> {
    /// Create an empty surface bound to a renderer
    pub fn new(renderer: &'r Renderer) -> Self {
        Self {
            renderer,
            fragments: Vec::new(),
            first_page: true,
            probes: 0,
        }
    }

    /// Blocks currently on the surface
    pub fn fragments(&self) -> &[BlockFragment] {
        &self.fragments
    }

    /// Get the stacked height of the current contents
    pub fn content_height(&self) -> f32 {
        self.fragments.iter().map(|f| f.height).sum()
    }

    /// Whether the last probe used cover styles
    pub fn is_first_page(&self) -> bool {
        self.first_page
    }

    /// Number of probes laid out so far
    pub fn probes(&self) -> usize {
        self.probes
    }

    /// Replace the surface contents
    pub fn lay_out(&mut self, lines: &[&str], first_page: bool) {
        let renderer = self.renderer;
        self.fragments.clear();
        self.fragments
            .extend(lines.iter().map(|line| renderer.render_block(line, first_page)));
        self.first_page = first_page;
        self.probes += 1;
    }
}

impl Measure for LayoutSurface<'_> {
    fn measure(&mut self, lines: &[&str], first_page: bool) -> Result<f32, MeasureError> {
        self.lay_out(lines, first_page);
        let height = self.content_height();
        log::trace!(
            "probe #{}: {} block(s), first_page={}, height={:.1}",
            self.probes,
            lines.len(),
            first_page,
            height
        );
        check_height(height)
    }
}
