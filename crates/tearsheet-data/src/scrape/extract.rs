//! Statement table extraction.

use crate::config::DataConfig;
use crate::error::{DataError, Result};
use crate::scrape::layout::{PageLayout, detect_layout, select_text};
use crate::table::RawTable;
use crate::types::{Frequency, Statement};
use async_trait::async_trait;
use scraper::Html;
use std::time::Duration;
use tracing::{debug, warn};

/// Desktop user agent sent with page fetches.
const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Header labels that name the period column rather than a period.
const NON_PERIOD_HEADERS: [&str; 2] = ["Year", "Quarter Ended"];

/// Source of page HTML. Production uses [`HttpFetcher`]; tests supply
/// fixture documents.
#[async_trait]
pub trait PageFetcher {
    /// Fetch the document at `url`.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// HTTP page fetcher with a politeness delay before every request.
#[derive(Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    delay: Duration,
}

impl HttpFetcher {
    /// Build a fetcher from the injected config.
    pub fn new(config: &DataConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            delay: config.fetch_delay,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        tokio::time::sleep(self.delay).await;

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(DataError::Http(format!(
                "Failed to fetch {}: HTTP {}",
                url,
                response.status()
            )));
        }

        Ok(response.text().await?)
    }
}

/// Extracts raw statement tables from the statements site.
#[derive(Debug)]
pub struct TableExtractor<F> {
    fetcher: F,
    base_url: String,
}

impl<F: PageFetcher> TableExtractor<F> {
    /// Build an extractor over a page fetcher.
    pub fn new(fetcher: F, config: &DataConfig) -> Self {
        Self {
            fetcher,
            base_url: config.site_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// URL of a ticker's statement page at a given frequency.
    #[must_use]
    pub fn statement_url(
        &self,
        ticker: &str,
        statement: Statement,
        frequency: Frequency,
    ) -> String {
        format!(
            "{}/stocks/{}/financials/{}{}",
            self.base_url,
            ticker.to_uppercase(),
            statement.url_path(),
            frequency.query()
        )
    }

    /// Scrape one statement table for a ticker.
    ///
    /// Returns the table with columns reversed to earliest-first.
    /// Unreadable cells come back as empty strings; a page with no
    /// recognizable table under either layout is an error.
    pub async fn extract(
        &self,
        ticker: &str,
        statement: Statement,
        frequency: Frequency,
    ) -> Result<RawTable> {
        if ticker.is_empty() {
            return Err(DataError::InvalidSymbol("Empty ticker".to_string()));
        }

        let url = self.statement_url(ticker, statement, frequency);
        debug!(%url, "fetching statement page");
        let body = self.fetcher.fetch(&url).await?;
        let document = Html::parse_document(&body);

        let Some(layout) = detect_layout(&document) else {
            warn!(ticker, ?statement, %url, "no table headers under either layout");
            return Err(DataError::EmptyTable {
                symbol: ticker.to_uppercase(),
                url,
            });
        };

        let table = read_table(&document, layout);
        if table.is_empty() {
            warn!(ticker, ?statement, "0 rows or columns collected");
        }
        Ok(table)
    }
}

/// Read the full table under a detected layout.
fn read_table(document: &Html, layout: PageLayout) -> RawTable {
    let col_count = count_columns(document, layout);
    let row_count = count_rows(document, layout);

    let mut periods = Vec::new();
    for col in 1..=col_count {
        let header = select_text(document, &layout.header_selector(col)).unwrap_or_default();
        if NON_PERIOD_HEADERS.contains(&header.as_str()) {
            continue;
        }
        periods.push(header);
    }

    let mut row_labels = Vec::with_capacity(row_count);
    let mut cells = Vec::with_capacity(row_count);
    for row in 1..=row_count {
        let label = select_text(document, &layout.label_selector(row)).unwrap_or_default();
        // Column 1 is the label; data starts at column 2.
        let mut row_cells = Vec::with_capacity(col_count.saturating_sub(1));
        for col in 2..=col_count {
            let cell = select_text(document, &layout.cell_selector(row, col)).unwrap_or_default();
            row_cells.push(cell);
        }
        row_labels.push(label);
        cells.push(row_cells);
    }

    // The site lists periods newest first.
    periods.reverse();
    for row in &mut cells {
        row.reverse();
    }

    // Data columns exclude the skipped label header; keep shapes aligned.
    let width = periods.len();
    for row in &mut cells {
        row.truncate(width);
        row.resize(width, String::new());
    }

    RawTable {
        periods,
        row_labels,
        cells,
    }
}

/// Probe header cells until one is missing.
fn count_columns(document: &Html, layout: PageLayout) -> usize {
    let mut count = 0;
    while select_text(document, &layout.header_selector(count + 1)).is_some() {
        count += 1;
    }
    count
}

/// Probe row label cells until one is missing.
fn count_rows(document: &Html, layout: PageLayout) -> usize {
    let mut count = 0;
    while select_text(document, &layout.label_selector(count + 1)).is_some() {
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fetcher that serves a fixed document for every URL.
    struct FixtureFetcher {
        body: String,
    }

    #[async_trait]
    impl PageFetcher for FixtureFetcher {
        async fn fetch(&self, _url: &str) -> Result<String> {
            Ok(self.body.clone())
        }
    }

    fn statement_page(wrapper_index: usize, period_header: &str) -> String {
        let table = format!(
            "<div><table>\
             <thead><tr><th>{}</th><th>2022</th><th>2021</th></tr></thead>\
             <tbody>\
             <tr><td>Revenue</td><td>120</td><td>100</td></tr>\
             <tr><td>Net Income</td><td>14</td><td>10</td></tr>\
             </tbody></table></div>",
            period_header
        );
        let mut divs = String::new();
        for i in 1..=6 {
            if i == wrapper_index {
                divs.push_str(&table);
            } else {
                divs.push_str("<div></div>");
            }
        }
        format!("<html><body><main>{}</main></body></html>", divs)
    }

    fn extractor(body: String) -> TableExtractor<FixtureFetcher> {
        TableExtractor::new(FixtureFetcher { body }, &DataConfig::default())
    }

    #[tokio::test]
    async fn test_extract_primary_layout() {
        let ex = extractor(statement_page(5, "Year"));
        let table = ex
            .extract("AAPL", Statement::IncomeStatement, Frequency::Annual)
            .await
            .unwrap();

        assert_eq!(table.periods, vec!["2021", "2022"]);
        assert_eq!(table.row_labels, vec!["Revenue", "Net Income"]);
        assert_eq!(table.cells[0], vec!["100", "120"]);
        assert_eq!(table.cells[1], vec!["10", "14"]);
    }

    #[tokio::test]
    async fn test_extract_alternate_layout() {
        let ex = extractor(statement_page(4, "Quarter Ended"));
        let table = ex
            .extract("AAPL", Statement::IncomeStatement, Frequency::Quarterly)
            .await
            .unwrap();

        assert_eq!(table.periods, vec!["2021", "2022"]);
        assert_eq!(table.height(), 2);
    }

    #[tokio::test]
    async fn test_extract_skips_period_column_header() {
        let ex = extractor(statement_page(5, "Year"));
        let table = ex
            .extract("MSFT", Statement::Ratios, Frequency::Annual)
            .await
            .unwrap();
        assert!(!table.periods.contains(&"Year".to_string()));
    }

    #[tokio::test]
    async fn test_extract_empty_page_is_error() {
        let ex = extractor("<html><body><main></main></body></html>".to_string());
        let result = ex
            .extract("AAPL", Statement::BalanceSheet, Frequency::Annual)
            .await;
        assert!(matches!(result, Err(DataError::EmptyTable { .. })));
    }

    #[tokio::test]
    async fn test_extract_rejects_empty_ticker() {
        let ex = extractor(statement_page(5, "Year"));
        let result = ex
            .extract("", Statement::IncomeStatement, Frequency::Annual)
            .await;
        assert!(matches!(result, Err(DataError::InvalidSymbol(_))));
    }

    #[test]
    fn test_statement_url_quarterly_flag() {
        let ex = extractor(String::new());
        let url = ex.statement_url("aapl", Statement::CashFlow, Frequency::Quarterly);
        assert_eq!(
            url,
            "https://stockanalysis.com/stocks/AAPL/financials/cash-flow-statement/?p=quarterly"
        );
    }
}
