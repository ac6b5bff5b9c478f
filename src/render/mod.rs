//! Render output: block fragments and card display lists

mod display;

pub use display::{BlockFragment, CardDisplay, DisplayItem, Emphasis, Renderer};
