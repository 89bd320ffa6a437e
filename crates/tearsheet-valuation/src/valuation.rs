//! Multiple-based valuation projections.
//!
//! Each valuation pairs a fundamental line item with the market
//! multiple historically applied to it: projected market value is the
//! multiple times the projected fundamental, and the share price falls
//! out after dividing by shares outstanding.

use crate::error::{Result, ValuationError};
use tearsheet_data::{Statement, StatementSet};
use tearsheet_forecast::series::parse_year;
use tearsheet_forecast::{LinearTrendModel, PeriodSeries};

/// Income-statement row holding the share count used for per-share
/// figures.
pub const SHARES_LABEL: &str = "Shares Outstanding (Basic)";

/// The fundamental/multiple pairs the engine can project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValuationKind {
    /// Revenue against the price-to-sales multiple
    Revenue,
    /// Net income against the price-to-earnings multiple
    Earnings,
    /// Shareholders' equity against the price-to-book multiple
    Equity,
    /// Free cash flow against the price-to-FCF multiple
    FreeCashFlow,
}

impl ValuationKind {
    /// All kinds, in tearsheet display order.
    pub const ALL: [Self; 4] = [
        Self::Revenue,
        Self::Earnings,
        Self::Equity,
        Self::FreeCashFlow,
    ];

    /// Statement holding the fundamental row.
    #[must_use]
    pub const fn statement(&self) -> Statement {
        match self {
            Self::Revenue | Self::Earnings => Statement::IncomeStatement,
            Self::Equity => Statement::BalanceSheet,
            Self::FreeCashFlow => Statement::CashFlow,
        }
    }

    /// Label of the fundamental row.
    #[must_use]
    pub const fn fundamental_label(&self) -> &'static str {
        match self {
            Self::Revenue => "Revenue",
            Self::Earnings => "Net Income",
            Self::Equity => "Shareholders' Equity",
            Self::FreeCashFlow => "Free Cash Flow",
        }
    }

    /// Label of the multiple row in the ratios table.
    #[must_use]
    pub const fn multiple_label(&self) -> &'static str {
        match self {
            Self::Revenue => "PS Ratio",
            Self::Earnings => "PE Ratio",
            Self::Equity => "PB Ratio",
            Self::FreeCashFlow => "P/FCF Ratio",
        }
    }

    /// Short display name for reports.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Revenue => "Revenue",
            Self::Earnings => "Earnings",
            Self::Equity => "Equity",
            Self::FreeCashFlow => "Free Cash Flow",
        }
    }
}

/// A projected valuation path over future fiscal years.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationProjection {
    /// Which fundamental/multiple pair was projected.
    pub kind: ValuationKind,
    /// Future fiscal years.
    pub years: Vec<i32>,
    /// Projected fundamental values.
    pub fundamentals: Vec<f64>,
    /// Multiple applied per year (forecast or trailing average).
    pub multiples: Vec<f64>,
    /// Share count per year (forecast or trailing average).
    pub shares: Vec<f64>,
    /// `multiple * fundamental` per year.
    pub market_values: Vec<f64>,
    /// `market_value / shares` per year.
    pub share_prices: Vec<f64>,
    /// Period-over-period fractional change of the projected price;
    /// the first period is always 0.0.
    pub returns: Vec<f64>,
}

impl ValuationProjection {
    /// First projected share price, the figure tearsheets headline.
    #[must_use]
    pub fn first_share_price(&self) -> Option<f64> {
        self.share_prices.first().copied()
    }
}

/// Projects valuations from a ticker's statements.
#[derive(Debug, Clone, Copy)]
pub struct ValuationEngine {
    /// Trailing periods used for fits and averages.
    pub review_period: usize,
    /// Future periods to project.
    pub horizon: usize,
    /// Forecast the multiple instead of averaging it.
    pub predict_multiple: bool,
    /// Forecast the share count instead of averaging it.
    pub predict_shares: bool,
}

impl Default for ValuationEngine {
    fn default() -> Self {
        Self {
            review_period: 5,
            horizon: 3,
            predict_multiple: false,
            predict_shares: false,
        }
    }
}

impl ValuationEngine {
    /// Project one valuation kind.
    ///
    /// A missing fundamental, multiple or share row is an error; the
    /// caller decides how to present the gap.
    pub fn project(
        &self,
        statements: &StatementSet,
        kind: ValuationKind,
    ) -> Result<ValuationProjection> {
        let model = LinearTrendModel::new(self.review_period, self.horizon);

        let fundamental_series = PeriodSeries::from_table_row(
            statements.get(kind.statement()),
            kind.fundamental_label(),
        )?;
        let fundamentals = model.forecast(&fundamental_series)?.trend;

        let multiple_series =
            PeriodSeries::from_table_row(&statements.ratios, kind.multiple_label())?;
        let multiples = self.project_driver(&model, &multiple_series, self.predict_multiple)?;

        let share_series =
            PeriodSeries::from_table_row(&statements.income_statement, SHARES_LABEL)?;
        let shares = self.project_driver(&model, &share_series, self.predict_shares)?;

        let years = self.projection_years(statements)?;

        let market_values: Vec<f64> = multiples
            .iter()
            .zip(&fundamentals)
            .map(|(m, f)| m * f)
            .collect();
        let share_prices: Vec<f64> = market_values
            .iter()
            .zip(&shares)
            .map(|(mv, s)| mv / s)
            .collect();

        let mut returns = Vec::with_capacity(share_prices.len());
        for (i, &price) in share_prices.iter().enumerate() {
            if i == 0 {
                returns.push(0.0);
            } else {
                let previous = share_prices[i - 1];
                if previous == 0.0 {
                    returns.push(0.0);
                } else {
                    returns.push((price - previous) / previous.abs());
                }
            }
        }

        Ok(ValuationProjection {
            kind,
            years,
            fundamentals,
            multiples,
            shares,
            market_values,
            share_prices,
            returns,
        })
    }

    /// Project every valuation kind, in display order.
    pub fn project_all(&self, statements: &StatementSet) -> Result<Vec<ValuationProjection>> {
        ValuationKind::ALL
            .iter()
            .map(|&kind| self.project(statements, kind))
            .collect()
    }

    /// Forecast a driver series or hold its trailing average flat.
    fn project_driver(
        &self,
        model: &LinearTrendModel,
        series: &PeriodSeries,
        predict: bool,
    ) -> Result<Vec<f64>> {
        if predict {
            Ok(model.forecast(series)?.trend)
        } else {
            let average = series.tail(self.review_period).mean();
            Ok(vec![average; self.horizon])
        }
    }

    /// Projection years anchored on the ratios history.
    ///
    /// The ratios table's last period is often partial, so projections
    /// start the year after the second-to-last ratio period.
    fn projection_years(&self, statements: &StatementSet) -> Result<Vec<i32>> {
        let years: Vec<i32> = statements
            .ratios
            .periods()
            .iter()
            .filter_map(|p| parse_year(p))
            .collect();
        if years.len() < 2 {
            return Err(ValuationError::InsufficientHistory {
                needed: 2,
                got: years.len(),
            });
        }
        let base = years[years.len() - 2] + 1;
        Ok((0..self.horizon as i32).map(|i| base + i).collect())
    }
}
