//! Valuation projections and cross-ticker comparison.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod compare;
pub mod error;
pub mod valuation;

pub use compare::{Category, Comparator, ComparisonTable};
pub use error::{Result, ValuationError};
pub use valuation::{SHARES_LABEL, ValuationEngine, ValuationKind, ValuationProjection};

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
