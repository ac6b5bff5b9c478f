//! Flat buffer protocol for zero-copy WASM bridge
//!
//! One rendered card is encoded into three typed arrays that JS views
//! directly in linear memory.
//!
//! ## u32 Buffer Layout:
//! ```text
//! Header:
//! [0]     MAGIC (0x43504752 = "CPGR" for validation)
//! [1]     SCHEMA_VERSION (protocol version, currently 1)
//! [2]     card index
//! [3]     card total
//! [4]     role (0 cover, 1 body, 2 closing)
//! [5]     item_count
//! [6]     text_buffer_len
//! [7]     color_count
//! [8]     u32_color_offset (index in u32_data where the color table starts)
//! [9]     flags: bit0=overflows
//! [10]    background color index
//! [11..]  items...
//!
//! Per-item:
//!   [opcode, flags, color, emphasis_color,
//!    text_offset, text_len, text_utf16_offset, text_utf16_len,
//!    style_start_idx, style_count]
//!     flags (text runs): bit0=italic, bits1-2=weight, bits3-4=block kind
//!     text fields are zero for rectangles
//!
//! At u32_color_offset:
//!   Per-color: [text_offset, text_len, text_utf16_offset, text_utf16_len]
//! ```
//!
//! ## f32 Buffer Layout:
//! ```text
//! Header: [width, height, content_height, budget]
//! Per-item: [x, y, width, height, font_size]
//! ```
//!
//! ## Style Buffer Layout:
//! ```text
//! Per bold span: [utf16_start, utf16_len] relative to the run's text
//! ```

use crate::document::BlockKind;
use crate::layout::{FontWeight, PageRole};
use crate::render::{CardDisplay, DisplayItem};
use crate::{Point, Rect};
use rustc_hash::FxHashMap;
use std::ops::Range;

/// Magic number for format validation: "CPGR" (Card PaGeR)
pub const MAGIC: u32 = 0x43504752;

/// Schema version for protocol compatibility checking
pub const SCHEMA_VERSION: u32 = 1;

/// Header size in u32 elements
pub const HEADER_SIZE: usize = 11;

/// Header size in f32 elements
pub const F32_HEADER_SIZE: usize = 4;

/// Opcodes for display items
pub const ITEM_ACCENT_BAR: u32 = 0;
pub const ITEM_TEXT_RUN: u32 = 1;
pub const ITEM_BORDER: u32 = 2;
pub const ITEM_DIVIDER: u32 = 3;
pub const ITEM_PAGE_NUMBER: u32 = 4;

/// Flags bitmask
pub const FLAG_ITALIC: u32 = 0b0001;
pub const FLAG_OVERFLOWS: u32 = 0b0001;

/// Number of u32 values per item
pub const U32_PER_ITEM: usize = 10;

/// Number of f32 values per item
/// [x, y, width, height, font_size]
pub const F32_PER_ITEM: usize = 5;

/// Number of u32 values per bold span
/// [utf16_start, utf16_len]
pub const U32_PER_STYLE: usize = 2;

/// Number of u32 values per color table entry
pub const U32_PER_COLOR: usize = 4;

/// Location of a string in the text buffer
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct TextSlot {
    offset: u32,
    len: u32,
    utf16_offset: u32,
    utf16_len: u32,
}

/// Render buffer for zero-copy WASM transfer
pub struct RenderBuffer {
    /// Integer data (header, item records, color table)
    pub u32_data: Vec<u32>,
    /// Float data (geometry)
    pub f32_data: Vec<f32>,
    /// UTF-8 text buffer
    pub text_data: Vec<u8>,
    /// Bold spans of text runs
    pub style_data: Vec<u32>,

    // Interned colors, written as a table in finalize()
    colors: FxHashMap<String, u32>,
    pending_colors: Vec<TextSlot>,

    // Track cumulative UTF-16 offset for efficient JS decoding
    utf16_text_offset: usize,
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self {
            u32_data: Vec::with_capacity(512),
            f32_data: Vec::with_capacity(256),
            text_data: Vec::with_capacity(2048),
            style_data: Vec::with_capacity(64),
            colors: FxHashMap::default(),
            pending_colors: Vec::new(),
            utf16_text_offset: 0,
        }
    }

    pub fn clear(&mut self) {
        self.u32_data.clear();
        self.f32_data.clear();
        self.text_data.clear();
        self.style_data.clear();
        self.colors.clear();
        self.pending_colors.clear();
        self.utf16_text_offset = 0;
    }

    /// Pre-allocate buffers so JS-held pointers survive the encode.
    ///
    /// Capacity is reused when sufficient, otherwise the vectors are
    /// recreated once up front.
    pub fn prepare(&mut self, item_count: usize, text_needed: usize) {
        let u32_target = HEADER_SIZE + item_count * U32_PER_ITEM + 64;
        let f32_target = F32_HEADER_SIZE + item_count * F32_PER_ITEM + 32;
        let text_target = text_needed + 256;

        if self.u32_data.capacity() < u32_target {
            self.u32_data = Vec::with_capacity(u32_target);
        }
        if self.f32_data.capacity() < f32_target {
            self.f32_data = Vec::with_capacity(f32_target);
        }
        if self.text_data.capacity() < text_target {
            self.text_data = Vec::with_capacity(text_target);
        }
        if self.style_data.capacity() < item_count * U32_PER_STYLE {
            self.style_data = Vec::with_capacity(item_count * U32_PER_STYLE);
        }
        self.clear();
    }

    /// Encode a whole card
    pub fn encode_card(&mut self, card: &CardDisplay, total: usize) {
        let text_needed = card
            .items
            .iter()
            .map(|item| match item {
                DisplayItem::TextRun { text, .. } | DisplayItem::PageNumber { text, .. } => text.len(),
                _ => 0,
            })
            .sum::<usize>();
        self.prepare(card.items.len(), text_needed);

        self.write_header(card, total);
        for item in &card.items {
            match item {
                DisplayItem::AccentBar { rect, color } => self.write_rect(ITEM_ACCENT_BAR, rect, color),
                DisplayItem::Border { rect, color } => self.write_rect(ITEM_BORDER, rect, color),
                DisplayItem::Divider { rect, color } => self.write_rect(ITEM_DIVIDER, rect, color),
                DisplayItem::TextRun {
                    position,
                    text,
                    kind,
                    font_size,
                    weight,
                    italic,
                    color,
                    emphasis,
                    emphasis_color,
                    width,
                } => {
                    let flags = text_flags(*kind, *weight, *italic);
                    self.write_text(
                        ITEM_TEXT_RUN,
                        *position,
                        text,
                        flags,
                        *font_size,
                        *width,
                        color,
                        emphasis,
                        emphasis_color,
                    );
                }
                DisplayItem::PageNumber {
                    position,
                    text,
                    font_size,
                    color,
                } => {
                    self.write_text(ITEM_PAGE_NUMBER, *position, text, 0, *font_size, 0.0, color, &[], color);
                }
            }
        }
        self.finalize();
    }

    /// Write card header
    pub fn write_header(&mut self, card: &CardDisplay, total: usize) {
        let background = self.intern_color(&card.background);
        let flags = if card.overflows() { FLAG_OVERFLOWS } else { 0 };

        self.u32_data.push(MAGIC); // [0] magic number
        self.u32_data.push(SCHEMA_VERSION); // [1] schema version
        self.u32_data.push(card.index as u32); // [2] card index
        self.u32_data.push(total as u32); // [3] card total
        self.u32_data.push(role_to_opcode(card.role)); // [4] role
        self.u32_data.push(0); // [5] item_count (placeholder)
        self.u32_data.push(0); // [6] text_buffer_len (placeholder)
        self.u32_data.push(0); // [7] color_count (placeholder)
        self.u32_data.push(0); // [8] u32_color_offset (placeholder)
        self.u32_data.push(flags); // [9] flags
        self.u32_data.push(background); // [10] background color index

        self.f32_data.push(card.bounds.width);
        self.f32_data.push(card.bounds.height);
        self.f32_data.push(card.content_height);
        self.f32_data.push(card.budget);
    }

    /// Write a filled rectangle
    pub fn write_rect(&mut self, opcode: u32, rect: &Rect, color: &str) {
        let color = self.intern_color(color);
        self.push_item(opcode, 0, color, color, TextSlot::default(), 0, 0);
        self.f32_data
            .extend_from_slice(&[rect.x, rect.y, rect.width, rect.height, 0.0]);
    }

    /// Write a text run; `emphasis` holds byte ranges within `text`
    #[allow(clippy::too_many_arguments)]
    pub fn write_text(
        &mut self,
        opcode: u32,
        position: Point,
        text: &str,
        flags: u32,
        font_size: f32,
        width: f32,
        color: &str,
        emphasis: &[Range<usize>],
        emphasis_color: &str,
    ) {
        let color = self.intern_color(color);
        let emphasis_color = self.intern_color(emphasis_color);
        let slot = self.push_text(text);

        // Bold spans are re-expressed in UTF-16 units for JS substring()
        let style_start = self.style_data.len() as u32;
        for range in emphasis {
            let (Some(before), Some(inside)) = (text.get(..range.start), text.get(range.clone())) else {
                continue;
            };
            self.style_data.push(utf16_len(before));
            self.style_data.push(utf16_len(inside));
        }
        let style_count = (self.style_data.len() as u32 - style_start) / U32_PER_STYLE as u32;

        self.push_item(opcode, flags, color, emphasis_color, slot, style_start, style_count);
        self.f32_data
            .extend_from_slice(&[position.x, position.y, width, 0.0, font_size]);
    }

    /// Finalize buffer: write the color table and synchronize the header
    pub fn finalize(&mut self) {
        if self.u32_data.len() < HEADER_SIZE {
            return;
        }

        let item_count = (self.u32_data.len() - HEADER_SIZE) / U32_PER_ITEM;
        self.u32_data[5] = item_count as u32;
        self.u32_data[8] = self.u32_data.len() as u32;
        self.u32_data[7] = self.pending_colors.len() as u32;
        for slot in &self.pending_colors {
            self.u32_data
                .extend_from_slice(&[slot.offset, slot.len, slot.utf16_offset, slot.utf16_len]);
        }
        self.u32_data[6] = self.text_data.len() as u32;

        #[cfg(debug_assertions)]
        self.validate_text_offsets();
    }

    /// Validate that all text offsets are within bounds (debug builds only)
    #[cfg(debug_assertions)]
    fn validate_text_offsets(&self) {
        let item_count = self.u32_data[5] as usize;
        let text_len = self.text_data.len();
        for item in 0..item_count {
            let base = HEADER_SIZE + item * U32_PER_ITEM;
            let offset = self.u32_data[base + 4] as usize;
            let len = self.u32_data[base + 5] as usize;
            debug_assert!(
                offset + len <= text_len,
                "Invalid text range for item {}: offset {} + length {} > text buffer size {}",
                item,
                offset,
                len,
                text_len
            );
        }
    }

    fn push_item(
        &mut self,
        opcode: u32,
        flags: u32,
        color: u32,
        emphasis_color: u32,
        slot: TextSlot,
        style_start: u32,
        style_count: u32,
    ) {
        self.u32_data.extend_from_slice(&[
            opcode,
            flags,
            color,
            emphasis_color,
            slot.offset,
            slot.len,
            slot.utf16_offset,
            slot.utf16_len,
            style_start,
            style_count,
        ]);
    }

    fn push_text(&mut self, text: &str) -> TextSlot {
        let slot = TextSlot {
            offset: self.text_data.len() as u32,
            len: text.len() as u32,
            utf16_offset: self.utf16_text_offset as u32,
            utf16_len: utf16_len(text),
        };
        self.text_data.extend_from_slice(text.as_bytes());
        self.utf16_text_offset += slot.utf16_len as usize;
        slot
    }

    /// Color table index of `color`, adding it on first use
    fn intern_color(&mut self, color: &str) -> u32 {
        if let Some(&index) = self.colors.get(color) {
            return index;
        }
        let index = self.pending_colors.len() as u32;
        let slot = self.push_text(color);
        self.pending_colors.push(slot);
        self.colors.insert(color.to_string(), index);
        index
    }

    // Accessors for WASM
    // Return u32 instead of usize for explicit WASM contract (wasm32 linear memory uses u32 offsets)

    pub fn u32_ptr(&self) -> u32 {
        self.u32_data.as_ptr() as u32
    }

    pub fn u32_len(&self) -> u32 {
        self.u32_data.len() as u32
    }

    pub fn f32_ptr(&self) -> u32 {
        self.f32_data.as_ptr() as u32
    }

    pub fn f32_len(&self) -> u32 {
        self.f32_data.len() as u32
    }

    pub fn text_ptr(&self) -> u32 {
        self.text_data.as_ptr() as u32
    }

    pub fn text_len(&self) -> u32 {
        self.text_data.len() as u32
    }

    pub fn style_ptr(&self) -> u32 {
        self.style_data.as_ptr() as u32
    }

    pub fn style_len(&self) -> u32 {
        self.style_data.len() as u32
    }
}

fn utf16_len(text: &str) -> u32 {
    text.chars().map(char::len_utf16).sum::<usize>() as u32
}

/// Convert PageRole to role opcode
pub fn role_to_opcode(role: PageRole) -> u32 {
    match role {
        PageRole::Cover => 0,
        PageRole::Body => 1,
        PageRole::Closing => 2,
    }
}

/// Pack the per-run text flags
pub fn text_flags(kind: BlockKind, weight: FontWeight, italic: bool) -> u32 {
    let weight = match weight {
        FontWeight::Normal => 0,
        FontWeight::Bold => 1,
        FontWeight::ExtraBold => 2,
    };
    let kind = match kind {
        BlockKind::Paragraph => 0,
        BlockKind::PrimaryHeading => 1,
        BlockKind::SecondaryHeading => 2,
        BlockKind::Quote => 3,
    };
    let italic = if italic { FLAG_ITALIC } else { 0 };
    italic | (weight << 1) | (kind << 3)
}
