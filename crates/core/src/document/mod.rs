//! PDF document adapter.
//!
//! This module contains:
//! - `pdf` - loading, page boxes and overlay compositing (PanelDocument)
//! - `text` - positioned text runs from content streams
//! - `font` - string decoding and glyph advances
//! - `overlay` - stroke primitives as content-stream operations
//! - `objects` - lookups over `lopdf` objects

mod font;
mod objects;
mod overlay;
pub mod pdf;
mod text;

// Re-export main types for convenience
pub use pdf::PanelDocument;
