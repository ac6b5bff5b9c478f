//! WASM bindings for the pager

mod flat_buffer;

pub use flat_buffer::{
    role_to_opcode, text_flags, RenderBuffer, F32_HEADER_SIZE, F32_PER_ITEM, HEADER_SIZE,
    ITEM_ACCENT_BAR, ITEM_BORDER, ITEM_DIVIDER, ITEM_PAGE_NUMBER, ITEM_TEXT_RUN, MAGIC,
    SCHEMA_VERSION, U32_PER_COLOR, U32_PER_ITEM, U32_PER_STYLE,
};

use crate::error::MeasureError;
use crate::layout::measure::check_height;
use crate::{CardPager, CardTemplate, Measure, Page, PaginationRules};
use std::str::FromStr;
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Oracle backed by a JS callback `(lines: string[], firstPage: boolean) => number`,
/// typically a hidden DOM container styled like the card
pub struct JsMeasure {
    callback: js_sys::Function,
}

impl JsMeasure {
    pub fn new(callback: js_sys::Function) -> Self {
        Self { callback }
    }
}

impl Measure for JsMeasure {
    fn measure(&mut self, lines: &[&str], first_page: bool) -> Result<f32, MeasureError> {
        let array: js_sys::Array = lines.iter().map(|line| JsValue::from_str(line)).collect();
        let value = self
            .callback
            .call2(&JsValue::NULL, &array, &JsValue::from_bool(first_page))
            .map_err(|err| MeasureError::Callback(describe(&err)))?;
        let height = value
            .as_f64()
            .ok_or_else(|| MeasureError::Callback(format!("expected a number, got {}", describe(&value))))?;
        check_height(height as f32)
    }
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

/// WASM-exposed pager wrapper
#[wasm_bindgen]
pub struct WasmPager {
    pager: CardPager,
    measure: Option<js_sys::Function>,
    pages: Vec<Page>,
    buffer: RenderBuffer,
}

#[wasm_bindgen]
impl WasmPager {
    /// Create a pager for a named template ("deep" or "classic")
    #[wasm_bindgen(constructor)]
    pub fn new(template: &str) -> Result<WasmPager, JsError> {
        let template = CardTemplate::from_str(template)?;
        Ok(Self {
            pager: CardPager::new(template),
            measure: None,
            pages: Vec::new(),
            buffer: RenderBuffer::new(),
        })
    }

    /// Replace the splitting rules from a partial JSON object
    #[wasm_bindgen(js_name = withRules)]
    pub fn with_rules(&mut self, json: &str) -> Result<(), JsError> {
        let rules = PaginationRules::from_json(json)?;
        self.pager = self.pager.clone().with_rules(rules)?;
        Ok(())
    }

    /// Override style sheet fields from a partial JSON object
    #[wasm_bindgen(js_name = withStyle)]
    pub fn with_style(&mut self, json: &str) -> Result<(), JsError> {
        let sheet = self.pager.style_sheet().clone().with_overrides(json)?;
        let rules = self.pager.rules().clone();
        self.pager = CardPager::with_style_sheet(sheet).with_rules(rules)?;
        Ok(())
    }

    /// Measure with a JS callback instead of the built-in text metrics
    #[wasm_bindgen(js_name = setMeasure)]
    pub fn set_measure(&mut self, callback: js_sys::Function) {
        self.measure = Some(callback);
    }

    /// Return to the built-in text metrics
    #[wasm_bindgen(js_name = clearMeasure)]
    pub fn clear_measure(&mut self) {
        self.measure = None;
    }

    /// Paginate `text`, returning each page's content
    pub fn paginate(&mut self, text: &str) -> Result<js_sys::Array, JsError> {
        let pages = match &self.measure {
            Some(callback) => self.pager.paginate_with(JsMeasure::new(callback.clone()), text)?,
            None => self.pager.paginate(text)?,
        };
        self.pages = pages;
        Ok(self
            .pages
            .iter()
            .map(|page| JsValue::from_str(&page.content()))
            .collect())
    }

    /// Get page count of the last run
    #[wasm_bindgen(js_name = pageCount)]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Get the pages of the last run as JSON
    #[wasm_bindgen(js_name = pagesJson)]
    pub fn pages_json(&self) -> Result<String, JsError> {
        Ok(serde_json::to_string(&self.pages)?)
    }

    /// Encode card `index` of the last run into the render buffer
    #[wasm_bindgen(js_name = renderCard)]
    pub fn render_card(&mut self, index: usize) -> Result<(), JsError> {
        let page = self
            .pages
            .get(index)
            .ok_or_else(|| JsError::new(&format!("no card {} in a deck of {}", index, self.pages.len())))?;
        let card = self.pager.render(page, self.pages.len());
        self.buffer.encode_card(&card, self.pages.len());
        Ok(())
    }

    // Zero-copy buffer accessors

    #[wasm_bindgen(js_name = u32Ptr)]
    pub fn u32_ptr(&self) -> u32 {
        self.buffer.u32_ptr()
    }

    #[wasm_bindgen(js_name = u32Len)]
    pub fn u32_len(&self) -> u32 {
        self.buffer.u32_len()
    }

    #[wasm_bindgen(js_name = f32Ptr)]
    pub fn f32_ptr(&self) -> u32 {
        self.buffer.f32_ptr()
    }

    #[wasm_bindgen(js_name = f32Len)]
    pub fn f32_len(&self) -> u32 {
        self.buffer.f32_len()
    }

    #[wasm_bindgen(js_name = textPtr)]
    pub fn text_ptr(&self) -> u32 {
        self.buffer.text_ptr()
    }

    #[wasm_bindgen(js_name = textLen)]
    pub fn text_len(&self) -> u32 {
        self.buffer.text_len()
    }

    #[wasm_bindgen(js_name = stylePtr)]
    pub fn style_ptr(&self) -> u32 {
        self.buffer.style_ptr()
    }

    #[wasm_bindgen(js_name = styleLen)]
    pub fn style_len(&self) -> u32 {
        self.buffer.style_len()
    }
}
