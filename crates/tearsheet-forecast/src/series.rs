//! Year-indexed observation series pulled from statement rows.

use crate::error::{ForecastError, Result};
use tearsheet_data::StatementTable;

/// A statement line item paired with the fiscal years it covers.
///
/// Only periods whose label starts with a parseable year survive;
/// non-period columns such as the ratios table's `"Current"` and
/// missing observations are dropped at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSeries {
    /// Fiscal years, earliest first.
    pub years: Vec<i32>,
    /// Observed values, aligned with `years`.
    pub values: Vec<f64>,
}

impl PeriodSeries {
    /// Build a series from raw year/value pairs, dropping NaN entries.
    #[must_use]
    pub fn new(pairs: impl IntoIterator<Item = (i32, f64)>) -> Self {
        let (years, values) = pairs
            .into_iter()
            .filter(|(_, v)| v.is_finite())
            .unzip();
        Self { years, values }
    }

    /// Extract a labelled row from a statement table.
    pub fn from_table_row(table: &StatementTable, label: &str) -> Result<Self> {
        let row = table.row(label).ok_or_else(|| ForecastError::MissingRow {
            label: label.to_string(),
        })?;

        let pairs = table
            .periods()
            .iter()
            .zip(row.iter())
            .filter_map(|(period, &value)| parse_year(period).map(|year| (year, value)));
        Ok(Self::new(pairs))
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.years.len()
    }

    /// True when the series has no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// The trailing `review_period` observations; the whole series when
    /// it is shorter than the window.
    #[must_use]
    pub fn tail(&self, review_period: usize) -> Self {
        let skip = self.len().saturating_sub(review_period);
        Self {
            years: self.years[skip..].to_vec(),
            values: self.values[skip..].to_vec(),
        }
    }

    /// Most recent fiscal year.
    #[must_use]
    pub fn last_year(&self) -> Option<i32> {
        self.years.last().copied()
    }

    /// Most recent observation.
    #[must_use]
    pub fn last_value(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Arithmetic mean of the observations.
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Mean period-over-period fractional growth.
    ///
    /// A step from a zero base contributes 0.0 instead of blowing up.
    #[must_use]
    pub fn average_growth(&self) -> f64 {
        if self.values.len() < 2 {
            return 0.0;
        }
        let steps = self.values.windows(2).map(|w| {
            if w[0] == 0.0 {
                0.0
            } else {
                (w[1] - w[0]) / w[0].abs()
            }
        });
        let (sum, count) = steps.fold((0.0, 0usize), |(s, c), g| (s + g, c + 1));
        sum / count as f64
    }
}

/// Fiscal year from a period label such as `"2022"` or `"2022-Q3"`.
#[must_use]
pub fn parse_year(period: &str) -> Option<i32> {
    let head: String = period.chars().take(4).collect();
    if head.len() < 4 {
        return None;
    }
    head.parse().ok()
}
