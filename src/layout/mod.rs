//! Measurement, page budgets and the pagination engine

mod engine;
pub mod font;
pub mod line_break;
pub mod measure;
pub mod pagination;
pub mod style;

pub use engine::LayoutSurface;
pub use font::{FontMetrics, FontWeight};
pub use line_break::{LineBreaker, LineLayout, Lines};
pub use measure::{FixedCostMeasure, KindCosts, Measure, MeasureFn};
pub use pagination::{
    is_break_char, Page, PageBreak, PageBudget, PageRole, PaginationRules, Paginator,
    PaginatorBuilder, DEFAULT_LOOKBACK_WINDOW, DEFAULT_MIN_CHUNK,
};
pub use style::{CardGeometry, CardTemplate, StyleSheet};
