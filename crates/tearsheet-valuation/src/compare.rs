//! Cross-ticker comparison of statement line items.

use crate::error::{Result, ValuationError};
use tearsheet_data::{Statement, StatementSet};
use tracing::warn;

/// Comparison category, grouping related selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Year-over-year growth rates
    Growth,
    /// Valuation and liquidity ratios
    Ratios,
    /// Yields on market price
    Yields,
}

impl Category {
    /// All categories.
    pub const ALL: [Self; 3] = [Self::Growth, Self::Ratios, Self::Yields];

    /// CLI-facing name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Growth => "growth",
            Self::Ratios => "ratios",
            Self::Yields => "yields",
        }
    }

    /// Parse from a CLI string.
    pub fn from_str_loose(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "growth" => Ok(Self::Growth),
            "ratios" => Ok(Self::Ratios),
            "yields" => Ok(Self::Yields),
            other => Err(ValuationError::UnknownSelector {
                category: other.to_string(),
                item: String::new(),
            }),
        }
    }

    /// Item keys available in this category.
    #[must_use]
    pub fn items(&self) -> Vec<&'static str> {
        SELECTORS
            .iter()
            .filter(|(category, ..)| category == self)
            .map(|(_, item, ..)| *item)
            .collect()
    }
}

/// (category, item key, statement, row label) registry.
const SELECTORS: [(Category, &str, Statement, &str); 17] = [
    (
        Category::Growth,
        "eps",
        Statement::IncomeStatement,
        "EPS Growth",
    ),
    (
        Category::Growth,
        "net_income",
        Statement::IncomeStatement,
        "Net Income Growth",
    ),
    (
        Category::Growth,
        "revenue",
        Statement::IncomeStatement,
        "Revenue Growth (YoY)",
    ),
    (Category::Ratios, "current", Statement::Ratios, "Current Ratio"),
    (
        Category::Ratios,
        "debt/equity",
        Statement::Ratios,
        "Debt / Equity Ratio",
    ),
    (Category::Ratios, "ev/fcf", Statement::Ratios, "EV/FCF Ratio"),
    (
        Category::Ratios,
        "ev/sales",
        Statement::Ratios,
        "EV/Sales Ratio",
    ),
    (Category::Ratios, "payout", Statement::Ratios, "Payout Ratio"),
    (Category::Ratios, "p/b", Statement::Ratios, "PB Ratio"),
    (Category::Ratios, "p/e", Statement::Ratios, "PE Ratio"),
    (Category::Ratios, "p/fcf", Statement::Ratios, "P/FCF Ratio"),
    (Category::Ratios, "p/s", Statement::Ratios, "PS Ratio"),
    (Category::Ratios, "quick", Statement::Ratios, "Quick Ratio"),
    (
        Category::Yields,
        "dividends",
        Statement::Ratios,
        "Dividend Yield",
    ),
    (
        Category::Yields,
        "earnings",
        Statement::Ratios,
        "Earnings Yield",
    ),
    (Category::Yields, "fcf", Statement::Ratios, "FCF Yield"),
    (
        Category::Yields,
        "sbb",
        Statement::Ratios,
        "Buyback Yield / Dilution",
    ),
];

/// One ticker's column in a comparison table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonColumn {
    /// Ticker symbol
    pub ticker: String,
    /// Period labels of this ticker's source table.
    pub periods: Vec<String>,
    /// Formatted values, aligned with `periods`.
    pub values: Vec<String>,
}

/// Comparison of one line item across tickers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonTable {
    /// Row label that was compared.
    pub label: String,
    /// One column per ticker.
    pub columns: Vec<ComparisonColumn>,
}

/// Compares statement line items across a set of tickers.
///
/// Holds each ticker's statements; a query for a label a ticker lacks
/// inserts a zero row into that ticker's table, so the query reports
/// zeros and repeating it sees a real row.
#[derive(Debug)]
pub struct Comparator {
    data: Vec<(String, StatementSet)>,
}

impl Comparator {
    /// Build a comparator over per-ticker statements.
    #[must_use]
    pub fn new(data: Vec<(String, StatementSet)>) -> Self {
        Self { data }
    }

    /// Tickers in comparison order.
    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.data.iter().map(|(ticker, _)| ticker.as_str())
    }

    /// Compare one selector across all tickers.
    pub fn compare(&mut self, category: Category, item: &str) -> Result<ComparisonTable> {
        let (statement, label) = selector(category, item)?;

        let mut columns = Vec::with_capacity(self.data.len());
        for (ticker, set) in &mut self.data {
            let table = set.get_mut(statement);
            if !table.has_row(label) {
                warn!(ticker = ticker.as_str(), label, "row missing, inserting zeros");
            }
            let values = table.row_or_insert_zero(label).to_vec();
            let formatted = values
                .iter()
                .map(|&v| format_value(category, v))
                .collect();
            columns.push(ComparisonColumn {
                ticker: ticker.clone(),
                periods: table.periods().to_vec(),
                values: formatted,
            });
        }

        Ok(ComparisonTable {
            label: label.to_string(),
            columns,
        })
    }
}

/// Resolve a selector to its source row.
pub fn selector(category: Category, item: &str) -> Result<(Statement, &'static str)> {
    SELECTORS
        .iter()
        .find(|(c, key, ..)| *c == category && *key == item)
        .map(|&(_, _, statement, label)| (statement, label))
        .ok_or_else(|| ValuationError::UnknownSelector {
            category: category.name().to_string(),
            item: item.to_string(),
        })
}

/// Growth and yield values are fractions; render them as percentages.
fn format_value(category: Category, value: f64) -> String {
    if value.is_nan() {
        return "n/a".to_string();
    }
    match category {
        Category::Growth | Category::Yields => format!("{:.2}%", value * 100.0),
        Category::Ratios => format!("{:.2}", value),
    }
}
