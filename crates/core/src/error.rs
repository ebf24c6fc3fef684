//! Error types for panelmark.

use thiserror::Error;

/// Primary error type for panel analysis and overlay operations.
#[derive(Error, Debug)]
pub enum PanelError {
    #[error("PDF parse error: {0}")]
    Parse(String),

    #[error("content stream error on page {page}: {msg}")]
    Content { page: usize, msg: String },

    #[error("page not found: {0}")]
    PageNotFound(usize),

    #[error("overlay error: {0}")]
    Compose(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias for PanelError.
pub type Result<T> = std::result::Result<T, PanelError>;
