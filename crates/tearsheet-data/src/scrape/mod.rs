//! Statement page scraping: layout detection and table extraction.

pub mod extract;
pub mod layout;

pub use extract::{HttpFetcher, PageFetcher, TableExtractor};
pub use layout::{PageLayout, detect_layout};
