//! Pagination of a document into height-budgeted cards
//!
//! The engine scans the document's lines in order against a measurement
//! oracle. Headings and quotes are placed whole or moved to the next page.
//! A paragraph that overflows is sized with a binary search over grapheme
//! offsets, its cut is pulled back to the nearest word or clause boundary,
//! and the remainder is carried to the front of the pending queue.

use crate::document::{BlockKind, Document};
use crate::error::{ConfigError, PaginateError, StyleError};
use crate::layout::measure::{check_height, Measure};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use unicode_segmentation::UnicodeSegmentation;

/// Graphemes scanned backward from a cut for a boundary
pub const DEFAULT_LOOKBACK_WINDOW: usize = 10;

/// Graphemes forced onto an empty page when nothing else fits
pub const DEFAULT_MIN_CHUNK: usize = 50;

/// Punctuation after which a paragraph may be cut, besides whitespace
const BREAK_PUNCTUATION: [char; 8] = [',', '.', '!', '?', '，', '。', '！', '？'];

/// Whether a paragraph may be cut right after `c`
pub fn is_break_char(c: char) -> bool {
    c.is_whitespace() || BREAK_PUNCTUATION.contains(&c)
}

/// Content height available on the first page and on every later page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageBudget {
    pub first: f32,
    pub interior: f32,
}

impl PageBudget {
    pub fn new(first: f32, interior: f32) -> Self {
        Self { first, interior }
    }

    /// Same budget on every page
    pub fn uniform(height: f32) -> Self {
        Self::new(height, height)
    }

    /// Get the active budget for a page position
    pub fn for_page(&self, first_page: bool) -> f32 {
        if first_page {
            self.first
        } else {
            self.interior
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let valid = |h: f32| h.is_finite() && h > 0.0;
        if valid(self.first) && valid(self.interior) {
            Ok(())
        } else {
            Err(ConfigError::InvalidBudget {
                first: self.first,
                interior: self.interior,
            })
        }
    }
}

/// Tunable splitting policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationRules {
    /// Graphemes scanned backward from a cut for a boundary
    pub lookback_window: usize,
    /// Graphemes forced onto an empty page when not even one fits
    pub min_chunk: usize,
    /// Close the first page before the first secondary heading
    pub break_before_first_section: bool,
}

impl Default for PaginationRules {
    fn default() -> Self {
        Self {
            lookback_window: DEFAULT_LOOKBACK_WINDOW,
            min_chunk: DEFAULT_MIN_CHUNK,
            break_before_first_section: true,
        }
    }
}

impl PaginationRules {
    /// Read rules from JSON, absent keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self, StyleError> {
        let rules: PaginationRules = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_chunk == 0 {
            return Err(ConfigError::InvalidRule("min_chunk must be at least 1"));
        }
        Ok(())
    }
}

/// Why a page was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageBreak {
    /// The next block did not fit
    Overflow,
    /// The first secondary heading starts a new page
    SectionStart,
    /// A heading or quote taller than a whole page, placed alone
    OversizedBlock,
    /// A paragraph was cut and continues on the next page
    ParagraphSplit,
    /// Nothing left to place
    EndOfDocument,
}

/// Position of a card within the deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageRole {
    Cover,
    Body,
    Closing,
}

impl PageRole {
    pub fn for_index(index: usize, total: usize) -> Self {
        if index == 0 {
            PageRole::Cover
        } else if index + 1 == total {
            PageRole::Closing
        } else {
            PageRole::Body
        }
    }
}

/// One emitted page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// Page index (0-based)
    pub index: usize,
    /// Laid out against the first-page budget
    pub is_first: bool,
    /// Whole lines or paragraph fragments, in input order
    pub lines: Vec<String>,
    pub ended_by: PageBreak,
}

impl Page {
    /// Lines joined with line feeds, the form handed to renderers
    pub fn content(&self) -> String {
        self.lines.join("\n")
    }

    /// Borrowed lines, the form handed to oracles
    pub fn line_refs(&self) -> Vec<&str> {
        self.lines.iter().map(String::as_str).collect()
    }

    pub fn role(&self, total: usize) -> PageRole {
        PageRole::for_index(self.index, total)
    }
}

/// Working state of one run
struct PageRun<'a> {
    /// Not-yet-placed lines and paragraph remainders
    queue: VecDeque<&'a str>,
    /// Items tentatively accepted for the page being built
    buffer: Vec<&'a str>,
    first_page: bool,
    pages: Vec<Page>,
    probes: usize,
}

impl<'a> PageRun<'a> {
    fn new(lines: &[&'a str]) -> Self {
        Self {
            queue: lines.iter().copied().collect(),
            buffer: Vec::new(),
            first_page: true,
            pages: Vec::new(),
            probes: 0,
        }
    }

    /// Emit the buffer as a page. An empty buffer emits nothing.
    fn finalize(&mut self, ended_by: PageBreak) {
        if self.buffer.is_empty() {
            return;
        }
        let page = Page {
            index: self.pages.len(),
            is_first: self.first_page,
            lines: self.buffer.drain(..).map(str::to_owned).collect(),
            ended_by,
        };
        log::debug!(
            "page {} closed ({:?}) with {} item(s)",
            page.index,
            ended_by,
            page.lines.len()
        );
        self.pages.push(page);
        self.first_page = false;
    }
}

/// Builder that refuses to produce a paginator without an oracle
pub struct PaginatorBuilder<M> {
    oracle: Option<M>,
    budget: Option<PageBudget>,
    rules: PaginationRules,
}

impl<M: Measure> Default for PaginatorBuilder<M> {
    fn default() -> Self {
        Self {
            oracle: None,
            budget: None,
            rules: PaginationRules::default(),
        }
    }
}

impl<M: Measure> PaginatorBuilder<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn oracle(mut self, oracle: M) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn budget(mut self, budget: PageBudget) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn rules(mut self, rules: PaginationRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn build(self) -> Result<Paginator<M>, ConfigError> {
        let oracle = self.oracle.ok_or(ConfigError::MissingOracle)?;
        let budget = self.budget.ok_or(ConfigError::MissingBudget)?;
        Paginator::new(oracle, budget, self.rules)
    }
}

/// The pagination engine
pub struct Paginator<M> {
    oracle: M,
    budget: PageBudget,
    rules: PaginationRules,
}

impl<M: Measure> Paginator<M> {
    pub fn new(oracle: M, budget: PageBudget, rules: PaginationRules) -> Result<Self, ConfigError> {
        budget.validate()?;
        rules.validate()?;
        Ok(Self {
            oracle,
            budget,
            rules,
        })
    }

    pub fn builder() -> PaginatorBuilder<M> {
        PaginatorBuilder::new()
    }

    pub fn budget(&self) -> PageBudget {
        self.budget
    }

    pub fn rules(&self) -> &PaginationRules {
        &self.rules
    }

    pub fn oracle(&self) -> &M {
        &self.oracle
    }

    pub fn into_oracle(self) -> M {
        self.oracle
    }

    /// Split `text` into pages. Whitespace-only text yields no pages.
    pub fn paginate(&mut self, text: &str) -> Result<Vec<Page>, PaginateError> {
        self.paginate_document(&Document::from_text(text))
    }

    pub fn paginate_document(&mut self, document: &Document<'_>) -> Result<Vec<Page>, PaginateError> {
        let mut run = PageRun::new(document.raw_lines());

        while let Some(item) = run.queue.pop_front() {
            let kind = BlockKind::classify(item);

            // The cover holds only what precedes the first section
            if self.rules.break_before_first_section
                && run.first_page
                && !run.buffer.is_empty()
                && kind == BlockKind::SecondaryHeading
            {
                run.finalize(PageBreak::SectionStart);
                run.queue.push_front(item);
                continue;
            }

            let budget = self.budget.for_page(run.first_page);
            run.buffer.push(item);
            let height = self.probe(&mut run)?;
            if height <= budget {
                continue;
            }
            run.buffer.pop();

            if kind.is_atomic() {
                if run.buffer.is_empty() {
                    log::warn!(
                        "{:?} block of {:.1}px exceeds the {:.1}px budget, placing it alone",
                        kind,
                        height,
                        budget
                    );
                    run.buffer.push(item);
                    run.finalize(PageBreak::OversizedBlock);
                } else {
                    run.finalize(PageBreak::Overflow);
                    run.queue.push_front(item);
                }
                continue;
            }

            self.split_paragraph(&mut run, item, budget)?;
        }

        run.finalize(PageBreak::EndOfDocument);
        log::debug!(
            "{} line(s) paginated into {} page(s) with {} probe(s)",
            document.len(),
            run.pages.len(),
            run.probes
        );
        Ok(run.pages)
    }

    fn probe(&mut self, run: &mut PageRun<'_>) -> Result<f32, PaginateError> {
        run.probes += 1;
        let height = self.oracle.measure(&run.buffer, run.first_page)?;
        Ok(check_height(height)?)
    }

    /// Place the longest fitting head of `item` and carry the rest over
    fn split_paragraph<'a>(
        &mut self,
        run: &mut PageRun<'a>,
        item: &'a str,
        budget: f32,
    ) -> Result<(), PaginateError> {
        let starts: Vec<usize> = item.grapheme_indices(true).map(|(i, _)| i).collect();
        let offset = |n: usize| starts.get(n).copied().unwrap_or(item.len());

        let fitted = self.fit_prefix(run, item, &starts, budget)?;
        let mut cut = lookback(item, &starts, fitted, self.rules.lookback_window);

        if cut == 0 && run.buffer.is_empty() {
            cut = starts.len().min(self.rules.min_chunk);
            log::warn!(
                "no prefix fits an empty page, forcing {} grapheme(s) through",
                cut
            );
        }

        if cut == 0 {
            run.finalize(PageBreak::Overflow);
            run.queue.push_front(item);
            return Ok(());
        }

        let (head, tail) = item.split_at(offset(cut));
        let ended_by = if head.trim().is_empty() {
            PageBreak::Overflow
        } else {
            run.buffer.push(head);
            PageBreak::ParagraphSplit
        };
        run.finalize(ended_by);

        if !tail.trim().is_empty() {
            run.queue.push_front(tail);
        }
        Ok(())
    }

    /// Binary search for the longest grapheme prefix that still fits.
    ///
    /// The whole item is already known not to fit, so lengths
    /// `1..len` are probed and 0 is the floor.
    fn fit_prefix<'a>(
        &mut self,
        run: &mut PageRun<'a>,
        item: &'a str,
        starts: &[usize],
        budget: f32,
    ) -> Result<usize, PaginateError> {
        let mut best = 0;
        let mut low = 1;
        let mut high = starts.len().saturating_sub(1);

        while low <= high {
            let mid = low + (high - low) / 2;
            run.buffer.push(&item[..starts[mid]]);
            let height = self.probe(run);
            run.buffer.pop();

            if height? <= budget {
                best = mid;
                low = mid + 1;
            } else {
                high = mid - 1;
            }
        }
        Ok(best)
    }
}

/// Move a cut of `cut` graphemes back to just after the nearest boundary
/// among the preceding `window` graphemes. The first grapheme is never
/// treated as a boundary, and without one the cut stays where it is.
fn lookback(item: &str, starts: &[usize], cut: usize, window: usize) -> usize {
    let end_of = |n: usize| starts.get(n + 1).copied().unwrap_or(item.len());
    for k in 1..=window.min(cut.saturating_sub(1)) {
        let index = cut - k;
        let grapheme = &item[starts[index]..end_of(index)];
        if grapheme.chars().next().is_some_and(is_break_char) {
            return index + 1;
        }
    }
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeasureError;
    use crate::layout::measure::{FixedCostMeasure, KindCosts, MeasureFn};

    fn costs() -> KindCosts {
        KindCosts {
            primary_heading: 60.0,
            secondary_heading: 40.0,
            quote: 30.0,
            paragraph: 10.0,
        }
    }

    fn paginator(first: f32, interior: f32) -> Paginator<FixedCostMeasure> {
        Paginator::builder()
            .oracle(FixedCostMeasure::new(costs(), 1.0))
            .budget(PageBudget::new(first, interior))
            .build()
            .unwrap()
    }

    fn contents(pages: &[Page]) -> Vec<String> {
        pages.iter().map(Page::content).collect()
    }

    #[test]
    fn test_builder_requires_oracle() {
        let result = PaginatorBuilder::<FixedCostMeasure>::new()
            .budget(PageBudget::uniform(100.0))
            .build();
        assert_eq!(result.err(), Some(ConfigError::MissingOracle));
    }

    #[test]
    fn test_builder_rejects_bad_config() {
        let oracle = || FixedCostMeasure::new(costs(), 1.0);
        let no_budget = Paginator::builder().oracle(oracle()).build();
        assert_eq!(no_budget.err(), Some(ConfigError::MissingBudget));

        let bad_budget = Paginator::new(oracle(), PageBudget::new(0.0, 100.0), PaginationRules::default());
        assert!(matches!(bad_budget, Err(ConfigError::InvalidBudget { .. })));

        let rules = PaginationRules {
            min_chunk: 0,
            ..PaginationRules::default()
        };
        assert!(Paginator::new(oracle(), PageBudget::uniform(100.0), rules).is_err());
    }

    #[test]
    fn test_empty_document() {
        let mut paginator = paginator(100.0, 100.0);
        assert!(paginator.paginate("").unwrap().is_empty());
        assert!(paginator.paginate("  \n\n\t").unwrap().is_empty());
        assert_eq!(paginator.oracle().probes(), 0);
    }

    #[test]
    fn test_everything_fits_one_page() {
        let mut paginator = paginator(500.0, 500.0);
        let pages = paginator
            .paginate("# Title\n\n> quote — Author\n\nShort intro.")
            .unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].is_first);
        assert_eq!(pages[0].lines, vec!["# Title", "> quote — Author", "Short intro."]);
        assert_eq!(pages[0].ended_by, PageBreak::EndOfDocument);
    }

    #[test]
    fn test_paragraph_overflow_moves_to_next_page() {
        // heading 67 + quote 46 = 113; intro 22 would make 135
        let mut paginator = paginator(120.0, 500.0);
        let pages = paginator
            .paginate("# Title\n\n> quote — Author\n\nShort intro.")
            .unwrap();
        assert!(pages.len() >= 2);
        assert_eq!(pages[0].lines[..2], ["# Title", "> quote — Author"]);
        assert!(pages[0].is_first);
        assert!(!pages[1].is_first);
        let joined: String = pages.iter().flat_map(|p| p.lines.iter().cloned()).collect();
        assert!(joined.ends_with("Short intro."));
    }

    #[test]
    fn test_forced_break_before_first_section() {
        let mut paginator = paginator(1000.0, 1000.0);
        let pages = paginator
            .paginate("# Title\n> quote\n## Section One\nBody\n## Section Two\nMore")
            .unwrap();
        assert_eq!(
            contents(&pages),
            vec![
                "# Title\n> quote",
                "## Section One\nBody\n## Section Two\nMore",
            ]
        );
        assert_eq!(pages[0].ended_by, PageBreak::SectionStart);
    }

    #[test]
    fn test_leading_section_heading_stays_on_cover() {
        let mut paginator = paginator(1000.0, 1000.0);
        let pages = paginator.paginate("## Section One\nBody").unwrap();
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_forced_break_can_be_disabled() {
        let rules = PaginationRules {
            break_before_first_section: false,
            ..PaginationRules::default()
        };
        let mut paginator = Paginator::new(
            FixedCostMeasure::new(costs(), 1.0),
            PageBudget::uniform(1000.0),
            rules,
        )
        .unwrap();
        let pages = paginator.paginate("# Title\n## Section One\nBody").unwrap();
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_atomic_block_moves_whole() {
        // paragraph 10 + 30 = 40, quote 30 + 32 = 62
        let mut paginator = paginator(80.0, 80.0);
        let text = format!("{}\n> {}", "p".repeat(30), "q".repeat(30));
        let pages = paginator.paginate(&text).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].lines, vec!["p".repeat(30)]);
        assert_eq!(pages[0].ended_by, PageBreak::Overflow);
        assert_eq!(pages[1].lines, vec![format!("> {}", "q".repeat(30))]);
    }

    #[test]
    fn test_oversized_heading_gets_own_page() {
        let mut paginator = paginator(50.0, 50.0);
        let text = format!("Intro\n# {}\nOutro", "T".repeat(100));
        let pages = paginator.paginate(&text).unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[1].lines.len(), 1);
        assert_eq!(pages[1].ended_by, PageBreak::OversizedBlock);
        assert_eq!(pages[2].lines, vec!["Outro"]);
    }

    #[test]
    fn test_paragraph_split_at_word_boundary() {
        // 10 + n chars per paragraph piece; budget 40 fits 30 chars
        let mut paginator = paginator(40.0, 40.0);
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa";
        let pages = paginator.paginate(text).unwrap();
        assert!(pages.len() > 1);
        for page in &pages[..pages.len() - 1] {
            assert_eq!(page.ended_by, PageBreak::ParagraphSplit);
            assert!(page.lines[0].ends_with(' '), "cut mid-word: {:?}", page.lines[0]);
        }
        let rebuilt: String = pages.iter().flat_map(|p| p.lines.iter().cloned()).collect();
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_cjk_punctuation_boundary() {
        let mut paginator = paginator(20.0, 20.0);
        let text = "所谓成长，就是接纳自己的局限。也是一种力量";
        let pages = paginator.paginate(text).unwrap();
        assert_eq!(pages[0].lines[0], "所谓成长，");
        let rebuilt: String = pages.iter().flat_map(|p| p.lines.iter().cloned()).collect();
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_hard_cut_without_boundary() {
        let mut paginator = paginator(30.0, 30.0);
        let text = "x".repeat(45);
        let pages = paginator.paginate(&text).unwrap();
        assert_eq!(pages[0].lines[0].len(), 20);
        assert_eq!(pages.len(), 3);
    }

    #[test]
    fn test_min_chunk_fallback_on_empty_page() {
        // The fixed paragraph cost alone overflows, so no prefix ever fits
        let mut paginator = paginator(5.0, 5.0);
        let text = "y".repeat(120);
        let pages = paginator.paginate(&text).unwrap();
        let sizes: Vec<usize> = pages.iter().map(|p| p.lines[0].len()).collect();
        assert_eq!(sizes, vec![50, 50, 20]);
    }

    #[test]
    fn test_zero_fit_with_full_buffer_retries_next_page() {
        // "Intro" takes 15 of 20; any prefix of the paragraph adds >= 11
        let mut paginator = paginator(20.0, 100.0);
        let pages = paginator.paginate("Intro\nlong paragraph text").unwrap();
        assert_eq!(contents(&pages), vec!["Intro", "long paragraph text"]);
        assert_eq!(pages[0].ended_by, PageBreak::Overflow);
    }

    #[test]
    fn test_whitespace_suffix_dropped() {
        let mut paginator = paginator(30.0, 30.0);
        let text = format!("{}{}", "w".repeat(20), " ".repeat(10));
        let pages = paginator.paginate(&text).unwrap();
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn test_first_page_flag_is_irreversible() {
        let mut paginator = paginator(30.0, 1000.0);
        let pages = paginator
            .paginate("# A very long cover heading\nShort\nShort\nShort")
            .unwrap();
        assert!(pages[0].is_first);
        assert!(pages[1..].iter().all(|p| !p.is_first));
    }

    #[test]
    fn test_oracle_errors_propagate() {
        struct Broken;
        impl Measure for Broken {
            fn measure(&mut self, _: &[&str], _: bool) -> Result<f32, MeasureError> {
                Err(MeasureError::Callback("surface detached".into()))
            }
        }
        let mut broken = Paginator::new(Broken, PageBudget::uniform(100.0), PaginationRules::default()).unwrap();
        assert!(matches!(broken.paginate("text"), Err(PaginateError::Measure(_))));
    }

    #[test]
    fn test_invalid_heights_rejected() {
        let mut nan = Paginator::new(
            MeasureFn(|_: &[&str], _: bool| f32::NAN),
            PageBudget::uniform(100.0),
            PaginationRules::default(),
        )
        .unwrap();
        assert!(matches!(
            nan.paginate("# Title\nsome paragraph text here"),
            Err(PaginateError::Measure(MeasureError::InvalidHeight(_)))
        ));

        let mut negative = Paginator::new(
            MeasureFn(|_: &[&str], _: bool| -1.0),
            PageBudget::uniform(100.0),
            PaginationRules::default(),
        )
        .unwrap();
        assert!(matches!(
            negative.paginate("text"),
            Err(PaginateError::Measure(MeasureError::InvalidHeight(_)))
        ));
    }

    #[test]
    fn test_indented_section_marker_is_paragraph() {
        let mut paginator = paginator(1000.0, 1000.0);
        let pages = paginator.paginate("# Title\nintro\n  ## not a section").unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].lines, vec!["# Title", "intro", "  ## not a section"]);
        assert_eq!(pages[0].ended_by, PageBreak::EndOfDocument);
    }

    #[test]
    fn test_closure_oracle_sees_page_position() {
        // Two lines fit on the cover, three everywhere else
        let oracle = MeasureFn(|lines: &[&str], first: bool| {
            lines.len() as f32 * if first { 15.0 } else { 10.0 }
        });
        let mut paginator = Paginator::new(oracle, PageBudget::uniform(30.0), PaginationRules::default()).unwrap();
        let pages = paginator.paginate("a\nb\nc\nd\ne\nf\ng").unwrap();
        let sizes: Vec<usize> = pages.iter().map(|p| p.lines.len()).collect();
        assert_eq!(sizes, vec![2, 3, 2]);
    }

    #[test]
    fn test_lookback() {
        let item = "one two three";
        let starts: Vec<usize> = item.grapheme_indices(true).map(|(i, _)| i).collect();
        // cut inside "three" backs up to after the space
        assert_eq!(lookback(item, &starts, 10, 10), 8);
        // a window too short to reach the space keeps the cut
        assert_eq!(lookback(item, &starts, 11, 2), 11);
        assert_eq!(lookback(item, &starts, 0, 10), 0);
    }

    #[test]
    fn test_rules_from_json() {
        let rules = PaginationRules::from_json(r#"{"lookback_window": 4}"#).unwrap();
        assert_eq!(rules.lookback_window, 4);
        assert_eq!(rules.min_chunk, DEFAULT_MIN_CHUNK);
        assert!(PaginationRules::from_json(r#"{"min_chunk": 0}"#).is_err());
    }

    #[test]
    fn test_page_roles() {
        assert_eq!(PageRole::for_index(0, 3), PageRole::Cover);
        assert_eq!(PageRole::for_index(1, 3), PageRole::Body);
        assert_eq!(PageRole::for_index(2, 3), PageRole::Closing);
        assert_eq!(PageRole::for_index(0, 1), PageRole::Cover);
    }
}
