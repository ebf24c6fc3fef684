//! panelmark - boundary and secondary-label marks for floor-panel PDFs.
//!
//! Pages of a floor-panel diagram carry panel labels such as `101Λ` laid out
//! in a fixed 2 x 4 grid. This crate finds the labels, groups them into packs
//! (`label / 100`), decides where one pack gives way to another and draws
//! red seams along those boundaries, circling any label that sits in a cell
//! dominated by a different pack.

pub mod api;
pub mod boundary;
pub mod compose;
pub mod document;
pub mod error;
pub mod grid;
pub mod pack;
pub mod scan;
pub mod template;
pub mod utils;

// Re-export high_level for convenience
pub use api::high_level;

pub use api::{ProcessOptions, analyze_pdf, process_pdf, process_pdf_to};
pub use boundary::{Mark, MarkPlan};
pub use document::PanelDocument;
pub use error::{PanelError, Result};
