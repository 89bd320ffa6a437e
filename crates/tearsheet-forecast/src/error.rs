//! Error types for forecasting operations.

use thiserror::Error;

/// Result type for forecasting operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while fitting or projecting a model.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The requested line item is absent from the statement
    #[error("Missing row '{label}' in statement table")]
    MissingRow {
        /// Row label that was looked up
        label: String,
    },

    /// Too few observations to fit the model
    #[error("Insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData {
        /// Minimum observations the model needs
        needed: usize,
        /// Observations available after filtering
        got: usize,
    },

    /// The design matrix is singular
    #[error("Singular system: regression design has no unique solution")]
    SingularSystem,

    /// Unsupported model order
    #[error("Unsupported ARIMA order ({p},{d},{q})")]
    UnsupportedOrder {
        /// Autoregressive order
        p: usize,
        /// Differencing order
        d: usize,
        /// Moving-average order
        q: usize,
    },
}
