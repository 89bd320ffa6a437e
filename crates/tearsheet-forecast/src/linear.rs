//! Linear-trend forecasting with a growth-compounding feature column.

use crate::error::{ForecastError, Result};
use crate::math::least_squares;
use crate::series::PeriodSeries;
use ndarray::{Array1, Array2};
use tearsheet_data::StatementTable;
use tracing::warn;

/// Projected values for future fiscal years.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendForecast {
    /// Future fiscal years, `last + 1 ..= last + horizon`.
    pub years: Vec<i32>,
    /// Plain trend-line projection.
    pub trend: Vec<f64>,
    /// Projection from the growth-augmented refit; all NaN when the
    /// augmented fit degrades.
    pub with_features: Vec<f64>,
}

/// Least-squares trend model over a trailing review window.
///
/// The model is stateless: every call re-fits from the series passed
/// in, so forecasting the same series twice gives identical output.
#[derive(Debug, Clone, Copy)]
pub struct LinearTrendModel {
    /// Trailing observations used for fitting.
    pub review_period: usize,
    /// Future periods to project.
    pub horizon: usize,
}

impl Default for LinearTrendModel {
    fn default() -> Self {
        Self {
            review_period: 5,
            horizon: 3,
        }
    }
}

impl LinearTrendModel {
    /// Build a model with an explicit window and horizon.
    #[must_use]
    pub const fn new(review_period: usize, horizon: usize) -> Self {
        Self {
            review_period,
            horizon,
        }
    }

    /// Forecast a statement row by label.
    pub fn forecast_row(&self, table: &StatementTable, label: &str) -> Result<TrendForecast> {
        let series = PeriodSeries::from_table_row(table, label)?;
        self.forecast(&series)
    }

    /// Fit the window and project `horizon` periods ahead.
    ///
    /// The plain column extrapolates a straight line. The augmented
    /// column refits with a compounding feature
    /// `c(t) = latest * (1 + g)^(t - anchor)` where `g` is the window's
    /// mean fractional growth and the anchor is the last historical
    /// year; if that refit is singular or fed non-finite inputs it
    /// degrades to all-NaN rather than failing the forecast.
    pub fn forecast(&self, series: &PeriodSeries) -> Result<TrendForecast> {
        let window = series.tail(self.review_period);
        if window.len() < 2 {
            return Err(ForecastError::InsufficientData {
                needed: 2,
                got: window.len(),
            });
        }

        let anchor = window.last_year().unwrap_or_default();
        let years: Vec<i32> = (1..=self.horizon as i32).map(|i| anchor + i).collect();

        // Years are centered on the anchor to keep the design well
        // scaled next to the other columns.
        let t: Vec<f64> = window.years.iter().map(|&y| f64::from(y - anchor)).collect();
        let y = Array1::from(window.values.clone());

        let mut design = Array2::zeros((window.len(), 2));
        for (i, &ti) in t.iter().enumerate() {
            design[[i, 0]] = ti;
            design[[i, 1]] = 1.0;
        }
        let beta = least_squares(&design, &y)?;

        let trend: Vec<f64> = years
            .iter()
            .map(|&year| beta[0] * f64::from(year - anchor) + beta[1])
            .collect();

        let with_features = self
            .forecast_with_features(&window, anchor, &years)
            .unwrap_or_else(|_| {
                warn!("augmented trend fit degraded, emitting NaN column");
                vec![f64::NAN; years.len()]
            });

        Ok(TrendForecast {
            years,
            trend,
            with_features,
        })
    }

    /// Refit with the compounding feature and predict the future rows.
    fn forecast_with_features(
        &self,
        window: &PeriodSeries,
        anchor: i32,
        future_years: &[i32],
    ) -> Result<Vec<f64>> {
        let latest = window.last_value().unwrap_or(f64::NAN);
        let growth = window.average_growth();
        let compound = |year: i32| latest * (1.0 + growth).powi(year - anchor);

        let mut design = Array2::zeros((window.len(), 3));
        for (i, &year) in window.years.iter().enumerate() {
            design[[i, 0]] = f64::from(year - anchor);
            design[[i, 1]] = compound(year);
            design[[i, 2]] = 1.0;
        }
        let y = Array1::from(window.values.clone());
        let beta = least_squares(&design, &y)?;

        Ok(future_years
            .iter()
            .map(|&year| {
                beta[0] * f64::from(year - anchor) + beta[1] * compound(year) + beta[2]
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn compounding_series() -> PeriodSeries {
        PeriodSeries::new(vec![(2020, 1000.0), (2021, 1100.0), (2022, 1210.0)])
    }

    #[test]
    fn test_forecast_years_follow_last_observation() {
        let model = LinearTrendModel::new(5, 3);
        let forecast = model.forecast(&compounding_series()).unwrap();
        assert_eq!(forecast.years, vec![2023, 2024, 2025]);
    }

    #[test]
    fn test_plain_trend_on_exact_line() {
        let series = PeriodSeries::new(vec![(2020, 10.0), (2021, 12.0), (2022, 14.0)]);
        let model = LinearTrendModel::new(5, 2);
        let forecast = model.forecast(&series).unwrap();
        assert_relative_eq!(forecast.trend[0], 16.0, epsilon = 1e-8);
        assert_relative_eq!(forecast.trend[1], 18.0, epsilon = 1e-8);
    }

    #[test]
    fn test_augmented_forecast_compounds_average_growth() {
        // 10% growth each year: the compounding feature reproduces the
        // series exactly, so the refit rides it into the future.
        let model = LinearTrendModel::new(5, 2);
        let forecast = model.forecast(&compounding_series()).unwrap();
        assert_relative_eq!(forecast.with_features[1], 1464.1, epsilon = 1e-3);
    }

    #[test]
    fn test_forecast_is_idempotent() {
        let model = LinearTrendModel::new(5, 3);
        let series = compounding_series();
        let first = model.forecast(&series).unwrap();
        let second = model.forecast(&series).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_degraded_augmented_column_is_nan() {
        // Zero growth makes the compounding feature a constant column,
        // collinear with the intercept.
        let series = PeriodSeries::new(vec![(2020, 50.0), (2021, 50.0), (2022, 50.0)]);
        let model = LinearTrendModel::new(5, 2);
        let forecast = model.forecast(&series).unwrap();
        assert!(forecast.with_features.iter().all(|v| v.is_nan()));
        // The plain trend still projects.
        assert_relative_eq!(forecast.trend[0], 50.0, epsilon = 1e-8);
    }

    #[test]
    fn test_single_observation_is_insufficient() {
        let series = PeriodSeries::new(vec![(2022, 10.0)]);
        let model = LinearTrendModel::default();
        assert!(matches!(
            model.forecast(&series),
            Err(ForecastError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_review_window_limits_fit() {
        // Old outlier outside a 3-year window must not affect the fit.
        let series = PeriodSeries::new(vec![
            (2018, 1_000_000.0),
            (2020, 10.0),
            (2021, 12.0),
            (2022, 14.0),
        ]);
        let model = LinearTrendModel::new(3, 1);
        let forecast = model.forecast(&series).unwrap();
        assert_relative_eq!(forecast.trend[0], 16.0, epsilon = 1e-6);
    }
}
