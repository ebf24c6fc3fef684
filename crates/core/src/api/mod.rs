//! High-level API module for panel analysis and overlay.
//!
//! # Example
//!
//! ```ignore
//! use panelmark_core::api::{process_pdf, ProcessOptions};
//!
//! let pdf_bytes = std::fs::read("floor.pdf")?;
//! let marked = process_pdf(&pdf_bytes, None)?;
//! std::fs::write("marked.pdf", marked)?;
//! ```

pub mod high_level;

// Re-export for convenience
pub use high_level::{
    Analysis, PageText, ProcessOptions, analyze_document, analyze_pdf, analyze_runs, process_pdf,
    process_pdf_to,
};
