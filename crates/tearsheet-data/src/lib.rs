//! Statement data layer: scraping, normalization, caching and quotes.
//!
//! The pipeline is extract -> normalize -> cache. [`scrape`] pulls raw
//! statement grids off the statements site, [`normalize`] turns them
//! into numeric [`table::StatementTable`]s, and [`cache`] persists them
//! as per-ticker CSV files. [`quotes`] supplies company metadata from a
//! JSON quote API.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod config;
pub mod error;
pub mod normalize;
pub mod quotes;
pub mod scrape;
pub mod table;
pub mod types;

pub use cache::{StatementCache, StatementSet};
pub use config::DataConfig;
pub use error::{DataError, Result};
pub use table::{RawTable, StatementTable};
pub use types::{Frequency, Statement};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
