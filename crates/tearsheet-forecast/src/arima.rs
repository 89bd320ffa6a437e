//! ARIMA forecasting fit by conditional sum of squares.
//!
//! Statement histories are short (a handful of annual or quarterly
//! observations), so the model space is deliberately small: AR and MA
//! orders of 0 or 1 and at most one difference. Coefficients come from
//! a coarse grid search over the stationarity region followed by a
//! local refinement, which is robust at these sample sizes.

use crate::error::{ForecastError, Result};
use crate::series::PeriodSeries;
use tearsheet_data::Frequency;

/// Coefficient search bound; keeps the fit inside the stationary and
/// invertible region.
const COEFF_BOUND: f64 = 0.98;

/// Coarse grid step.
const GRID_STEP: f64 = 0.02;

/// Refinement step around the best grid point.
const REFINE_STEP: f64 = 0.002;

/// An ARIMA(p, d, q) specification with p, q in {0, 1} and d in {0, 1}.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArimaModel {
    p: usize,
    d: usize,
    q: usize,
}

impl ArimaModel {
    /// Build a model, rejecting orders outside the supported space.
    pub fn new(p: usize, d: usize, q: usize) -> Result<Self> {
        if p > 1 || d > 1 || q > 1 {
            return Err(ForecastError::UnsupportedOrder { p, d, q });
        }
        Ok(Self { p, d, q })
    }

    /// The (1, 1, 1) specification used for statement line projections.
    #[must_use]
    pub const fn standard() -> Self {
        Self { p: 1, d: 1, q: 1 }
    }

    /// The (1, 0, 1) specification used for review-window projections.
    #[must_use]
    pub const fn stationary() -> Self {
        Self { p: 1, d: 0, q: 1 }
    }

    /// Default forecast steps per reporting frequency.
    #[must_use]
    pub const fn default_steps(frequency: Frequency) -> usize {
        match frequency {
            Frequency::Annual => 3,
            Frequency::Quarterly => 4,
        }
    }

    /// Forecast `steps` future observations of a series.
    pub fn forecast(&self, series: &PeriodSeries, steps: usize) -> Result<Vec<f64>> {
        self.forecast_values(&series.values, steps)
    }

    /// Forecast `steps` future observations from raw values.
    pub fn forecast_values(&self, values: &[f64], steps: usize) -> Result<Vec<f64>> {
        let needed = 3 + self.d;
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        let z = if self.d == 1 {
            values.windows(2).map(|w| w[1] - w[0]).collect()
        } else {
            values.to_vec()
        };

        // A constant is estimated only for the undifferenced model,
        // matching the usual no-trend convention after differencing.
        let mean = if self.d == 0 {
            z.iter().sum::<f64>() / z.len() as f64
        } else {
            0.0
        };
        let centered: Vec<f64> = z.iter().map(|v| v - mean).collect();

        let (phi, theta) = self.fit_css(&centered);

        // Residuals under the fitted coefficients, for the MA forecast.
        let residuals = residuals(&centered, phi, theta);
        let last_e = residuals.last().copied().unwrap_or(0.0);
        let last_z = centered.last().copied().unwrap_or(0.0);

        let mut z_hat = Vec::with_capacity(steps);
        let mut prev = phi * last_z + theta * last_e;
        z_hat.push(prev + mean);
        for _ in 1..steps {
            prev *= phi;
            z_hat.push(prev + mean);
        }

        if self.d == 1 {
            let mut level = values.last().copied().unwrap_or(f64::NAN);
            Ok(z_hat
                .into_iter()
                .map(|dz| {
                    level += dz;
                    level
                })
                .collect())
        } else {
            Ok(z_hat)
        }
    }

    /// Grid-search the conditional sum of squares, then refine.
    fn fit_css(&self, z: &[f64]) -> (f64, f64) {
        let mut best = (0.0, 0.0);
        let mut best_css = css(z, 0.0, 0.0);

        let coarse = search_grid(self.p, self.q, -COEFF_BOUND, COEFF_BOUND, GRID_STEP);
        for (phi, theta) in coarse {
            let value = css(z, phi, theta);
            if value < best_css {
                best_css = value;
                best = (phi, theta);
            }
        }

        let refined = search_grid(
            self.p,
            self.q,
            -GRID_STEP,
            GRID_STEP,
            REFINE_STEP,
        );
        let center = best;
        for (dphi, dtheta) in refined {
            let phi = (center.0 + dphi).clamp(-COEFF_BOUND, COEFF_BOUND);
            let theta = (center.1 + dtheta).clamp(-COEFF_BOUND, COEFF_BOUND);
            let value = css(z, phi, theta);
            if value < best_css {
                best_css = value;
                best = (phi, theta);
            }
        }

        best
    }
}

/// Candidate (phi, theta) pairs; an excluded order pins its
/// coefficient at zero.
fn search_grid(p: usize, q: usize, lo: f64, hi: f64, step: f64) -> Vec<(f64, f64)> {
    let axis = |enabled: bool| -> Vec<f64> {
        if !enabled {
            return vec![0.0];
        }
        let mut values = Vec::new();
        let mut v = lo;
        while v <= hi + step / 2.0 {
            values.push(v);
            v += step;
        }
        values
    };

    let phis = axis(p == 1);
    let thetas = axis(q == 1);
    let mut pairs = Vec::with_capacity(phis.len() * thetas.len());
    for &phi in &phis {
        for &theta in &thetas {
            pairs.push((phi, theta));
        }
    }
    pairs
}

/// One-step-ahead residuals with zero pre-sample values.
fn residuals(z: &[f64], phi: f64, theta: f64) -> Vec<f64> {
    let mut e = Vec::with_capacity(z.len());
    for (t, &zt) in z.iter().enumerate() {
        let ar = if t > 0 { phi * z[t - 1] } else { 0.0 };
        let ma = if t > 0 { theta * e[t - 1] } else { 0.0 };
        e.push(zt - ar - ma);
    }
    e
}

/// Conditional sum of squared residuals.
fn css(z: &[f64], phi: f64, theta: f64) -> f64 {
    residuals(z, phi, theta).iter().map(|e| e * e).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rejects_unsupported_order() {
        assert!(matches!(
            ArimaModel::new(2, 1, 1),
            Err(ForecastError::UnsupportedOrder { .. })
        ));
        assert!(ArimaModel::new(1, 0, 1).is_ok());
    }

    #[test]
    fn test_insufficient_data() {
        let model = ArimaModel::standard();
        let result = model.forecast_values(&[1.0, 2.0], 3);
        assert!(matches!(
            result,
            Err(ForecastError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_constant_series_forecasts_its_level() {
        let model = ArimaModel::stationary();
        let forecast = model
            .forecast_values(&[5.0, 5.0, 5.0, 5.0, 5.0], 3)
            .unwrap();
        for value in forecast {
            assert_relative_eq!(value, 5.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_differenced_model_follows_a_trend() {
        let model = ArimaModel::standard();
        let values = [100.0, 110.0, 120.0, 130.0, 140.0];
        let forecast = model.forecast_values(&values, 3).unwrap();

        assert_eq!(forecast.len(), 3);
        assert!(forecast.iter().all(|v| v.is_finite()));
        // A steadily rising series keeps rising.
        assert!(forecast[0] > 140.0);
        assert!(forecast[2] >= forecast[0]);
    }

    #[test]
    fn test_stationary_fit_over_review_window() {
        let series = PeriodSeries::new(vec![
            (2015, 40.0),
            (2016, 42.0),
            (2017, 41.0),
            (2018, 20.0),
            (2019, 19.0),
            (2020, 21.0),
            (2021, 20.5),
            (2022, 19.8),
        ]);
        let window = series.tail(5);
        let forecast = ArimaModel::stationary().forecast(&window, 5).unwrap();

        assert_eq!(forecast.len(), 5);
        // Only the recent level is visible, not the old regime.
        for value in &forecast {
            assert!(value.is_finite());
            assert!(*value > 15.0 && *value < 25.0);
        }
    }

    #[test]
    fn test_forecast_length_matches_steps() {
        let model = ArimaModel::stationary();
        let values = [3.0, 4.0, 3.5, 4.2, 3.9, 4.1];
        assert_eq!(model.forecast_values(&values, 5).unwrap().len(), 5);
    }

    #[test]
    fn test_default_steps_per_frequency() {
        assert_eq!(ArimaModel::default_steps(Frequency::Annual), 3);
        assert_eq!(ArimaModel::default_steps(Frequency::Quarterly), 4);
    }

    #[test]
    fn test_forecast_from_series() {
        let series = PeriodSeries::new(vec![
            (2018, 10.0),
            (2019, 12.0),
            (2020, 11.0),
            (2021, 13.0),
            (2022, 12.5),
        ]);
        let forecast = ArimaModel::standard().forecast(&series, 3).unwrap();
        assert_eq!(forecast.len(), 3);
    }
}
