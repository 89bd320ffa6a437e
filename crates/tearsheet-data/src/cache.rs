//! CSV-backed statement cache.
//!
//! One file per ticker, statement and frequency under
//! `{root}/{TICKER}/{Annual|Quarter}/{TICKER}_{statement}.csv`. The
//! first column holds row labels (empty header cell), the remaining
//! columns are period labels; missing values serialize as empty fields.
//! There is no staleness tracking: refreshing means deleting the file.

use crate::config::DataConfig;
use crate::error::Result;
use crate::normalize::normalize;
use crate::scrape::{PageFetcher, TableExtractor};
use crate::table::StatementTable;
use crate::types::{Frequency, Statement};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Scrape-through cache over normalized statement tables.
#[derive(Debug)]
pub struct StatementCache {
    config: DataConfig,
}

/// All four statements of one ticker at one frequency.
#[derive(Debug, Clone)]
pub struct StatementSet {
    /// Income statement
    pub income_statement: StatementTable,
    /// Balance sheet
    pub balance_sheet: StatementTable,
    /// Cash flow statement
    pub cash_flow: StatementTable,
    /// Ratios and per-share metrics
    pub ratios: StatementTable,
}

impl StatementSet {
    /// Access a statement by identifier.
    #[must_use]
    pub const fn get(&self, statement: Statement) -> &StatementTable {
        match statement {
            Statement::IncomeStatement => &self.income_statement,
            Statement::BalanceSheet => &self.balance_sheet,
            Statement::CashFlow => &self.cash_flow,
            Statement::Ratios => &self.ratios,
        }
    }

    /// Mutable access to a statement by identifier.
    pub const fn get_mut(&mut self, statement: Statement) -> &mut StatementTable {
        match statement {
            Statement::IncomeStatement => &mut self.income_statement,
            Statement::BalanceSheet => &mut self.balance_sheet,
            Statement::CashFlow => &mut self.cash_flow,
            Statement::Ratios => &mut self.ratios,
        }
    }
}

impl StatementCache {
    /// Create a cache rooted at the configured dataset directory.
    #[must_use]
    pub const fn new(config: DataConfig) -> Self {
        Self { config }
    }

    /// Path of one cached statement file.
    #[must_use]
    pub fn statement_path(
        &self,
        ticker: &str,
        statement: Statement,
        frequency: Frequency,
    ) -> PathBuf {
        let ticker = ticker.to_uppercase();
        self.config
            .dataset_root
            .join(&ticker)
            .join(frequency.folder())
            .join(format!("{}_{}.csv", ticker, statement.file_stem()))
    }

    /// Load a cached statement, or `None` when it has not been scraped.
    pub fn load(
        &self,
        ticker: &str,
        statement: Statement,
        frequency: Frequency,
    ) -> Result<Option<StatementTable>> {
        let path = self.statement_path(ticker, statement, frequency);
        if !path.exists() {
            return Ok(None);
        }

        let mut reader = csv::Reader::from_path(&path)?;
        let periods: Vec<String> = reader
            .headers()?
            .iter()
            .skip(1)
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let label = record.get(0).unwrap_or("").to_string();
            let values = record
                .iter()
                .skip(1)
                .map(|field| {
                    if field.is_empty() {
                        f64::NAN
                    } else {
                        field.parse().unwrap_or(f64::NAN)
                    }
                })
                .collect();
            rows.push((label, values));
        }

        Ok(Some(StatementTable::new(periods, rows)))
    }

    /// Persist a statement table.
    pub fn store(
        &self,
        ticker: &str,
        statement: Statement,
        frequency: Frequency,
        table: &StatementTable,
    ) -> Result<()> {
        let path = self.statement_path(ticker, statement, frequency);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(&path)?;
        let mut header = vec![String::new()];
        header.extend(table.periods().iter().cloned());
        writer.write_record(&header)?;

        for (label, values) in table.iter_rows() {
            let mut record = vec![label.to_string()];
            record.extend(values.iter().map(|v| {
                if v.is_nan() {
                    String::new()
                } else {
                    v.to_string()
                }
            }));
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Delete one cached statement file, if present.
    pub fn invalidate(
        &self,
        ticker: &str,
        statement: Statement,
        frequency: Frequency,
    ) -> Result<()> {
        let path = self.statement_path(ticker, statement, frequency);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }

    /// Return the cached statement, scraping and persisting on a miss.
    pub async fn load_or_scrape<F: PageFetcher>(
        &self,
        extractor: &TableExtractor<F>,
        ticker: &str,
        statement: Statement,
        frequency: Frequency,
    ) -> Result<StatementTable> {
        if let Some(table) = self.load(ticker, statement, frequency)? {
            debug!(ticker, ?statement, ?frequency, "statement cache hit");
            return Ok(table);
        }

        let raw = extractor.extract(ticker, statement, frequency).await?;
        let table = normalize(raw, frequency);
        self.store(ticker, statement, frequency, &table)?;
        Ok(table)
    }

    /// Load all four statements for a ticker, scraping misses.
    pub async fn load_all<F: PageFetcher>(
        &self,
        extractor: &TableExtractor<F>,
        ticker: &str,
        frequency: Frequency,
    ) -> Result<StatementSet> {
        Ok(StatementSet {
            income_statement: self
                .load_or_scrape(extractor, ticker, Statement::IncomeStatement, frequency)
                .await?,
            balance_sheet: self
                .load_or_scrape(extractor, ticker, Statement::BalanceSheet, frequency)
                .await?,
            cash_flow: self
                .load_or_scrape(extractor, ticker, Statement::CashFlow, frequency)
                .await?,
            ratios: self
                .load_or_scrape(extractor, ticker, Statement::Ratios, frequency)
                .await?,
        })
    }
}
