//! Excel tearsheet rendering.
//!
//! [`tearsheet::TearsheetRenderer`] lays a ticker's statements,
//! forecasts and valuations out as one dated worksheet per run.
//! [`archive`] keeps a JSON record of every rendered sheet so the
//! write-only workbook can be rebuilt with past dates intact.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod archive;
pub mod error;
pub mod layout;
pub mod tearsheet;

pub use archive::{CellRecord, MergeRecord, Sheet, SheetArchive};
pub use error::{RenderError, Result};
pub use layout::{CellStyle, Layout};
pub use tearsheet::TearsheetRenderer;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
