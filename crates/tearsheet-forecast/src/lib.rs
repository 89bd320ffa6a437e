//! Forecasting models for statement line items.
//!
//! [`series::PeriodSeries`] lifts a statement row into a year-indexed
//! series; [`linear::LinearTrendModel`] projects it with a least-squares
//! trend plus a growth-compounding refit, and [`arima::ArimaModel`]
//! provides short-horizon ARIMA projections.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod arima;
pub mod error;
pub mod linear;
pub mod math;
pub mod series;

pub use arima::ArimaModel;
pub use error::{ForecastError, Result};
pub use linear::{LinearTrendModel, TrendForecast};
pub use series::PeriodSeries;

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
