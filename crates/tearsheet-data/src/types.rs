//! Statement and reporting-frequency identifiers.

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};

/// The four financial statements published per ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statement {
    /// Income statement
    IncomeStatement,
    /// Balance sheet
    BalanceSheet,
    /// Cash flow statement
    CashFlow,
    /// Ratios and per-share metrics
    Ratios,
}

impl Statement {
    /// All statements, in scrape order.
    pub const ALL: [Self; 4] = [
        Self::IncomeStatement,
        Self::BalanceSheet,
        Self::CashFlow,
        Self::Ratios,
    ];

    /// File stem used in cached CSV names.
    #[must_use]
    pub const fn file_stem(&self) -> &'static str {
        match self {
            Self::IncomeStatement => "income_statement",
            Self::BalanceSheet => "balance_sheet",
            Self::CashFlow => "cash_flow",
            Self::Ratios => "ratios",
        }
    }

    /// URL path segment under a ticker's financials page.
    #[must_use]
    pub const fn url_path(&self) -> &'static str {
        match self {
            Self::IncomeStatement => "",
            Self::BalanceSheet => "balance-sheet/",
            Self::CashFlow => "cash-flow-statement/",
            Self::Ratios => "ratios/",
        }
    }

    /// Parse from a CLI or config string.
    pub fn from_str_loose(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "income_statement" | "income" => Ok(Self::IncomeStatement),
            "balance_sheet" | "balance" => Ok(Self::BalanceSheet),
            "cash_flow" | "cashflow" => Ok(Self::CashFlow),
            "ratios" => Ok(Self::Ratios),
            _ => Err(DataError::Parse(format!("Unknown statement: {}", s))),
        }
    }
}

/// Reporting frequency of a statement table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Frequency {
    /// Fiscal-year periods
    Annual,
    /// Fiscal-quarter periods
    Quarterly,
}

impl Frequency {
    /// Directory name in the statement cache.
    #[must_use]
    pub const fn folder(&self) -> &'static str {
        match self {
            Self::Annual => "Annual",
            Self::Quarterly => "Quarter",
        }
    }

    /// Query string appended to statement URLs.
    #[must_use]
    pub const fn query(&self) -> &'static str {
        match self {
            Self::Annual => "",
            Self::Quarterly => "?p=quarterly",
        }
    }

    /// Parse from a CLI or config string.
    pub fn from_str_loose(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "a" | "annual" => Ok(Self::Annual),
            "q" | "quarter" | "quarterly" => Ok(Self::Quarterly),
            _ => Err(DataError::Parse(format!("Unknown frequency: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("annual", Frequency::Annual)]
    #[case("A", Frequency::Annual)]
    #[case("quarterly", Frequency::Quarterly)]
    #[case("Q", Frequency::Quarterly)]
    fn test_frequency_parse(#[case] input: &str, #[case] expected: Frequency) {
        assert_eq!(Frequency::from_str_loose(input).unwrap(), expected);
    }

    #[test]
    fn test_frequency_parse_invalid() {
        assert!(Frequency::from_str_loose("monthly").is_err());
    }

    #[test]
    fn test_statement_file_stems_unique() {
        let stems: Vec<_> = Statement::ALL.iter().map(|s| s.file_stem()).collect();
        let mut deduped = stems.clone();
        deduped.dedup();
        assert_eq!(stems.len(), deduped.len());
    }

    #[test]
    fn test_quarterly_query_flag() {
        assert_eq!(Frequency::Quarterly.query(), "?p=quarterly");
        assert_eq!(Frequency::Annual.query(), "");
    }
}
