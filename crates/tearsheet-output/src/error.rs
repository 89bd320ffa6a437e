//! Error types for report rendering.

use thiserror::Error;

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that can occur while rendering a tearsheet workbook.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Workbook writing failed
    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    /// Sheet archive (de)serialization failed
    #[error("Sheet archive error: {0}")]
    Archive(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
