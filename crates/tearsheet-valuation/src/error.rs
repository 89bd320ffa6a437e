//! Error types for valuation operations.

use tearsheet_forecast::ForecastError;
use thiserror::Error;

/// Result type for valuation operations.
pub type Result<T> = std::result::Result<T, ValuationError>;

/// Errors that can occur while projecting valuations or comparing
/// tickers.
#[derive(Debug, Error)]
pub enum ValuationError {
    /// Underlying forecast failed
    #[error(transparent)]
    Forecast(#[from] ForecastError),

    /// Not enough ratio history to anchor projection years
    #[error("Insufficient ratio history: need at least {needed} periods, got {got}")]
    InsufficientHistory {
        /// Periods required
        needed: usize,
        /// Periods available
        got: usize,
    },

    /// Unknown comparison selector
    #[error("Unknown comparison item '{item}' in category '{category}'")]
    UnknownSelector {
        /// Category that was queried
        category: String,
        /// Item key that was queried
        item: String,
    },
}
