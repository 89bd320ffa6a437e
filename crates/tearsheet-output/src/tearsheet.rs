//! Tearsheet workbook rendering.
//!
//! One rendered sheet per run date. All numbers are formatted into
//! display strings here so archived sheets replay byte-for-byte; rows
//! the statements cannot fill render as zeros, and fields the original
//! report left unpopulated render as literal `NaN`.

use crate::archive::{CellRecord, MergeRecord, Sheet, SheetArchive};
use crate::error::Result;
use crate::layout::{CellStyle, Layout, format_for};
use chrono::{Local, NaiveDate};
use rust_xlsxwriter::Workbook;
use std::path::{Path, PathBuf};
use tearsheet_data::quotes::{CompanyProfile, QuoteSummary};
use tearsheet_data::{StatementSet, StatementTable};
use tearsheet_forecast::series::parse_year;
use tearsheet_forecast::{LinearTrendModel, PeriodSeries};
use tearsheet_valuation::{ValuationEngine, ValuationKind};
use tracing::warn;

/// Renders dated tearsheet workbooks for one ticker at a time.
#[derive(Debug)]
pub struct TearsheetRenderer {
    layout: Layout,
    model: LinearTrendModel,
    engine: ValuationEngine,
    out_dir: PathBuf,
}

impl TearsheetRenderer {
    /// Build a renderer writing workbooks under `out_dir`.
    pub fn new(out_dir: impl Into<PathBuf>, model: LinearTrendModel, engine: ValuationEngine) -> Self {
        Self {
            layout: Layout::default(),
            model,
            engine,
            out_dir: out_dir.into(),
        }
    }

    /// Render today's sheet and return the workbook path.
    pub fn render(
        &self,
        ticker: &str,
        statements: &StatementSet,
        profile: Option<&CompanyProfile>,
        quote: Option<&QuoteSummary>,
    ) -> Result<PathBuf> {
        self.render_dated(ticker, statements, profile, quote, Local::now().date_naive())
    }

    /// Render the sheet for a given run date.
    ///
    /// The workbook is rebuilt from the sheet archive plus this run, so
    /// earlier dates' sheets survive and a same-date rerun replaces its
    /// sheet.
    pub fn render_dated(
        &self,
        ticker: &str,
        statements: &StatementSet,
        profile: Option<&CompanyProfile>,
        quote: Option<&QuoteSummary>,
        date: NaiveDate,
    ) -> Result<PathBuf> {
        let ticker = ticker.to_uppercase();
        let sheet_name = date.format("%Y-%m-%d").to_string();
        let sheet = self.build_sheet(&ticker, statements, profile, quote, sheet_name);

        std::fs::create_dir_all(&self.out_dir)?;
        let workbook_path = self.out_dir.join(format!("{ticker}_tearsheet.xlsx"));
        let archive_path = self.out_dir.join(format!("{ticker}_tearsheet.sheets.json"));

        let mut archive = SheetArchive::load(&archive_path)?;
        archive.insert(sheet);
        write_workbook(&workbook_path, &archive, &self.layout)?;
        archive.store(&archive_path)?;
        Ok(workbook_path)
    }

    /// Assemble every section into one sheet's cell records.
    pub fn build_sheet(
        &self,
        ticker: &str,
        statements: &StatementSet,
        profile: Option<&CompanyProfile>,
        quote: Option<&QuoteSummary>,
        name: String,
    ) -> Sheet {
        let mut cells = Vec::new();
        let mut merges = Vec::new();

        self.banner(&mut cells, ticker, profile);
        self.market_profile(&mut cells, statements, profile, quote);
        self.key_financials(&mut cells, statements);
        self.valuation_method(&mut cells, statements);
        self.business_summary(&mut cells, ticker, profile);
        self.investment_highlights(&mut cells, &mut merges, profile);
        self.historical_growth(&mut cells, statements);
        self.historical_ratios(&mut cells, statements);
        self.rebuilt_share(&mut cells, statements);

        Sheet {
            name,
            cells,
            merges,
        }
    }

    /// Company name banner across the top of the sheet.
    fn banner(&self, cells: &mut Vec<CellRecord>, ticker: &str, profile: Option<&CompanyProfile>) {
        let name = profile
            .map(|p| p.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(ticker);
        push(cells, 0, 0, name, CellStyle::Header);
        for col in 1..self.layout.sheet_columns {
            push(cells, 0, col, "", CellStyle::Header);
        }
    }

    fn market_profile(
        &self,
        cells: &mut Vec<CellRecord>,
        statements: &StatementSet,
        profile: Option<&CompanyProfile>,
        quote: Option<&QuoteSummary>,
    ) {
        let income = &statements.income_statement;
        let ratios = &statements.ratios;

        let price = quote.and_then(|q| q.price).unwrap_or(0.0);
        let volume = quote.and_then(|q| q.volume).unwrap_or(0.0);
        let high = profile.and_then(|p| p.high_52w).unwrap_or(0.0);
        let low = profile.and_then(|p| p.low_52w).unwrap_or(0.0);
        let shares_mil = profile
            .and_then(|p| p.shares_outstanding)
            .map_or(0.0, |s| s / 1_000_000.0);
        let country = profile.map(|p| p.country.clone()).unwrap_or_default();

        let market_cap = last_or_zero(ratios, "Market Capitalization");
        let dividend_yield = if market_cap == 0.0 {
            0.0
        } else {
            last_or_zero(&statements.cash_flow, "Dividends Paid").abs() / market_cap
        };

        let rows = vec![
            vec!["Closing Price".to_string(), fmt_dollar_decimal(price)],
            vec!["52-Week High".to_string(), fmt_dollar_decimal(high)],
            vec!["52-Week Low".to_string(), fmt_dollar_decimal(low)],
            vec![
                "Shares Outstanding (Mil)".to_string(),
                fmt_basic(shares_mil),
            ],
            vec![
                "EPS (TTM)".to_string(),
                fmt_dollar_decimal(last_or_zero(income, "EPS (Basic)")),
            ],
            vec!["Marketcap (Mil)".to_string(), fmt_basic(market_cap)],
            vec!["Average Volume (TTM)".to_string(), fmt_basic(volume)],
            vec!["Beta".to_string(), "NaN".to_string()],
            vec!["Financial Health".to_string(), "NaN".to_string()],
            vec!["Country".to_string(), country],
            vec![
                "P/E".to_string(),
                fmt_decimal(last_or_zero(ratios, "PE Ratio")),
            ],
            vec![
                "Gross Margin".to_string(),
                fmt_pct(last_or_zero(income, "Gross Margin") * 100.0),
            ],
            vec![
                "Operating Margin".to_string(),
                fmt_pct(last_or_zero(income, "Operating Margin") * 100.0),
            ],
            vec![
                "Net Margin".to_string(),
                fmt_pct(last_or_zero(income, "Profit Margin") * 100.0),
            ],
            vec![
                "Free Cash Flow Margin".to_string(),
                fmt_pct(last_or_zero(income, "Free Cash Flow Margin") * 100.0),
            ],
            vec![
                "Dividend Yield".to_string(),
                fmt_pct(dividend_yield * 100.0),
            ],
        ];

        let section = &self.layout.market_profile;
        table(cells, section.row, section.cols, &["Market Profile", ""], &rows);
    }

    fn key_financials(&self, cells: &mut Vec<CellRecord>, statements: &StatementSet) {
        let income = &statements.income_statement;
        let cash_flow = &statements.cash_flow;

        let (dividends, proj_dividends) = if income.has_row("Dividend Per Share") {
            (
                last_or_zero(income, "Dividend Per Share"),
                self.forecast_row_first(income, "Dividend Per Share"),
            )
        } else {
            (0.0, 0.0)
        };

        let rows = vec![
            vec![
                "Revenue (Mil)".to_string(),
                fmt_dollar_basic(last_or_zero(income, "Revenue")),
                fmt_dollar_basic(self.forecast_row_first(income, "Revenue")),
            ],
            vec![
                "Operating Income (Mil)".to_string(),
                fmt_dollar_basic(last_or_zero(income, "Operating Income")),
                fmt_dollar_basic(self.forecast_row_first(income, "Operating Income")),
            ],
            vec![
                "Net Income (Mil)".to_string(),
                fmt_dollar_basic(last_or_zero(income, "Net Income")),
                fmt_dollar_basic(self.forecast_row_first(income, "Net Income")),
            ],
            vec![
                "EPS".to_string(),
                fmt_dollar_decimal(last_or_zero(income, "EPS (Basic)")),
                fmt_dollar_decimal(self.forecast_row_first(income, "EPS (Basic)")),
            ],
            vec![
                "Free Cash Flow (Mil)".to_string(),
                fmt_dollar_basic(last_or_zero(cash_flow, "Free Cash Flow")),
                fmt_dollar_basic(self.forecast_row_first(cash_flow, "Free Cash Flow")),
            ],
            vec![
                "Dividends Per Share".to_string(),
                fmt_dollar_decimal(dividends),
                fmt_dollar_decimal(proj_dividends),
            ],
        ];

        let section = &self.layout.key_financials;
        table(
            cells,
            section.row,
            section.cols,
            &["Key Financials", "TTM", "Projected (1-Year)"],
            &rows,
        );
    }

    fn valuation_method(&self, cells: &mut Vec<CellRecord>, statements: &StatementSet) {
        let weight = 100.0 / ValuationKind::ALL.len() as f64;

        let mut rows = Vec::with_capacity(ValuationKind::ALL.len());
        let mut prices = Vec::with_capacity(ValuationKind::ALL.len());
        for kind in ValuationKind::ALL {
            let price = match self.engine.project(statements, kind) {
                Ok(projection) => projection
                    .share_prices
                    .last()
                    .copied()
                    .filter(|p| p.is_finite())
                    .unwrap_or(0.0),
                Err(err) => {
                    warn!(method = kind.display_name(), %err, "valuation unavailable");
                    0.0
                }
            };
            prices.push(price);
            rows.push(vec![
                kind.display_name().to_string(),
                fmt_pct(weight),
                fmt_dollar_decimal(price),
            ]);
        }

        let section = &self.layout.valuation_method;
        table(
            cells,
            section.row,
            section.cols,
            &["Valuation Method", "Weight", "Projected (1-Year)"],
            &rows,
        );

        let implied = prices.iter().sum::<f64>() / prices.len() as f64;
        let total_row = section.row + 1 + rows.len() as u32;
        push(cells, total_row, section.cols[0], "Implied Value:", CellStyle::TotalLabel);
        push(cells, total_row, section.cols[1], fmt_pct(100.0), CellStyle::TotalValue);
        push(
            cells,
            total_row,
            section.cols[2],
            fmt_dollar_decimal(implied),
            CellStyle::TotalValue,
        );
    }

    fn business_summary(
        &self,
        cells: &mut Vec<CellRecord>,
        ticker: &str,
        profile: Option<&CompanyProfile>,
    ) {
        let exchange = profile
            .map(|p| p.exchange.as_str())
            .filter(|e| !e.is_empty())
            .unwrap_or("Exchange");
        let industry = profile.map(|p| p.industry.clone()).unwrap_or_default();
        let sector = profile.map(|p| p.sector.clone()).unwrap_or_default();

        let section = &self.layout.business_summary;
        table(
            cells,
            section.row,
            &section.cols[..2],
            &["Business Summary", ""],
            &[
                vec![exchange.to_string(), ticker.to_string()],
                vec!["Industry".to_string(), industry],
                vec!["Sector".to_string(), sector],
            ],
        );
        table(
            cells,
            section.row,
            &section.cols[2..],
            &["", ""],
            &[
                vec!["Growth Rating".to_string(), "NaN".to_string()],
                vec!["Dividend Rating".to_string(), "NaN".to_string()],
                vec!["Five Year Growth Price".to_string(), "NaN".to_string()],
            ],
        );
    }

    /// Subheader strip plus one merged, wrapped description block.
    fn investment_highlights(
        &self,
        cells: &mut Vec<CellRecord>,
        merges: &mut Vec<MergeRecord>,
        profile: Option<&CompanyProfile>,
    ) {
        let section = &self.layout.investment_highlights;
        for (i, &col) in section.cols.iter().enumerate() {
            let text = if i == 0 { "Investment Highlights" } else { "" };
            push(cells, section.row, col, text, CellStyle::Subheader);
        }

        let description = profile.map(|p| p.description.clone()).unwrap_or_default();
        merges.push(MergeRecord {
            first_row: section.row + 1,
            first_col: section.cols[0],
            last_row: section.row + self.layout.highlights_depth,
            last_col: *section.cols.last().unwrap_or(&section.cols[0]),
            value: description,
            style: CellStyle::Wrapped,
        });
    }

    fn historical_growth(&self, cells: &mut Vec<CellRecord>, statements: &StatementSet) {
        let income = &statements.income_statement;
        let cash_flow = &statements.cash_flow;

        // Revenue growth arrives as its own statement row; the rest are
        // derived from the level rows.
        let revenue = self.growth_from_row(income, "Revenue Growth (YoY)");
        let operating = self.growth_from_changes(income, "Operating Income");
        let net_income = self.growth_from_changes(income, "Net Income");
        let eps = self.growth_from_changes(income, "EPS (Basic)");
        let fcf = self.growth_from_changes(cash_flow, "Free Cash Flow");
        let dividends = if income.has_row("Dividend Growth") {
            self.growth_from_row(income, "Dividend Growth")
        } else {
            (0.0, 0.0)
        };

        let row = |label: &str, (average, future): (f64, f64)| {
            vec![
                label.to_string(),
                fmt_pct(average * 100.0),
                fmt_pct(future * 100.0),
            ]
        };
        let rows = vec![
            row("Revenue", revenue),
            row("Operating Income", operating),
            row("Net Income", net_income),
            row("EPS", eps),
            row("Free Cash Flow", fcf),
            row("Dividends", dividends),
        ];

        let section = &self.layout.historical_growth;
        table(
            cells,
            section.row,
            section.cols,
            &["Growth History", "Historical Growth", "Future Growth"],
            &rows,
        );
    }

    fn historical_ratios(&self, cells: &mut Vec<CellRecord>, statements: &StatementSet) {
        let ratios = &statements.ratios;
        let row = |label: &str, source: &str| {
            let (mean, max, min) = row_stats(ratios, source);
            vec![
                label.to_string(),
                fmt_decimal(mean),
                fmt_decimal(max),
                fmt_decimal(min),
            ]
        };
        let rows = vec![
            row("Price-to-Sales", "PS Ratio"),
            row("Price-to-Earnings", "PE Ratio"),
            row("Price-to-Book", "PB Ratio"),
            row("Price-to-FCF", "P/FCF Ratio"),
            row("EV/FCF", "EV/FCF Ratio"),
        ];

        let section = &self.layout.historical_ratios;
        table(
            cells,
            section.row,
            section.cols,
            &["Historical Ratios", "Average", "High", "Low"],
            &rows,
        );
    }

    /// Rebuild the share price from per-share metrics and a growth sum.
    fn rebuilt_share(&self, cells: &mut Vec<CellRecord>, statements: &StatementSet) {
        let income = &statements.income_statement;
        let balance = &statements.balance_sheet;
        let cash_flow = &statements.cash_flow;
        let ratios = &statements.ratios;

        let shares = last_or_zero(income, "Shares Outstanding (Basic)");
        let revenue_per_share = if shares == 0.0 {
            0.0
        } else {
            last_or_zero(income, "Revenue") / shares
        };
        let metrics = [
            ("Book Per Share", last_or_zero(balance, "Book Value Per Share")),
            ("Earnings Per Share", last_or_zero(income, "EPS (Basic)")),
            ("Dividend Per Share", last_or_zero(income, "Dividend Per Share")),
            ("FCF Per Share", last_or_zero(income, "Free Cash Flow Per Share")),
            ("Net Cash/Share", last_or_zero(balance, "Net Cash Per Share")),
            ("Revenue/Share", revenue_per_share),
        ];
        let rebuilt: f64 = metrics.iter().map(|(_, v)| v).sum();

        let eps_growth = if income.has_row("EPS Growth") {
            mean_or_zero(income, "EPS Growth")
        } else {
            series_mean(&pct_change_series(income, "EPS (Basic)"))
        };
        let fcf_growth = if cash_flow.has_row("Free Cash Flow Growth") {
            mean_or_zero(cash_flow, "Free Cash Flow Growth")
        } else {
            series_mean(&pct_change_series(cash_flow, "Free Cash Flow"))
        };
        let margin_sum = mean_or_zero(income, "Gross Margin")
            + mean_or_zero(income, "Operating Margin")
            + mean_or_zero(income, "Profit Margin")
            + mean_or_zero(income, "Free Cash Flow Margin");
        let growth = mean_or_zero(ratios, "Return on Equity (ROE)")
            + mean_or_zero(ratios, "Return on Assets (ROA)")
            + mean_or_zero(ratios, "Return on Capital (ROIC)")
            + eps_growth
            + mean_or_zero(income, "Revenue Growth (YoY)")
            + fcf_growth
            + mean_or_zero(ratios, "Buyback Yield / Dilution")
            + mean_or_zero(balance, "Net Cash / Debt Growth")
            + mean_or_zero(ratios, "Earnings Yield")
            + mean_or_zero(ratios, "FCF Yield")
            + margin_sum / 3.0;
        let rebuilt_price = rebuilt * growth + rebuilt;

        let mut total_weight = 0.0;
        let mut rows = Vec::with_capacity(metrics.len());
        for (label, value) in metrics {
            let weight = if rebuilt == 0.0 { 0.0 } else { value / rebuilt * 100.0 };
            total_weight += weight;
            rows.push(vec![
                label.to_string(),
                fmt_dollar_decimal(value),
                fmt_pct(weight),
            ]);
        }

        let section = &self.layout.rebuilt_share;
        table(
            cells,
            section.row,
            section.cols,
            &["Rebuilt Share Price", "Per Share", "Weight"],
            &rows,
        );

        let growth_row = section.row + 1 + rows.len() as u32;
        push(cells, growth_row, section.cols[0], "Growth Ratio", CellStyle::TotalLabel);
        push(
            cells,
            growth_row,
            section.cols[1],
            format!("{}x", fmt_decimal(growth)),
            CellStyle::TotalValue,
        );
        push(cells, growth_row, section.cols[2], "", CellStyle::TotalValue);

        let price_row = growth_row + 1;
        push(cells, price_row, section.cols[0], "Rebuilt Share Price", CellStyle::TotalLabel);
        push(
            cells,
            price_row,
            section.cols[1],
            fmt_dollar_decimal(rebuilt_price),
            CellStyle::TotalValue,
        );
        push(
            cells,
            price_row,
            section.cols[2],
            fmt_pct(total_weight),
            CellStyle::TotalValue,
        );
    }

    /// Historical mean and first forecast step of a growth-rate row.
    fn growth_from_row(&self, table: &StatementTable, label: &str) -> (f64, f64) {
        let average = mean_or_zero(table, label);
        let future = self.forecast_row_first(table, label);
        (average, future)
    }

    /// Same, but from period-over-period changes of a level row.
    fn growth_from_changes(&self, table: &StatementTable, label: &str) -> (f64, f64) {
        let series = pct_change_series(table, label);
        (series_mean(&series), self.forecast_first(&series))
    }

    /// First trend step of a row, zero when the row or fit is unusable.
    fn forecast_row_first(&self, table: &StatementTable, label: &str) -> f64 {
        match PeriodSeries::from_table_row(table, label) {
            Ok(series) => self.forecast_first(&series),
            Err(err) => {
                warn!(label, %err, "row unavailable for projection");
                0.0
            }
        }
    }

    fn forecast_first(&self, series: &PeriodSeries) -> f64 {
        match self.model.forecast(series) {
            Ok(forecast) => forecast
                .trend
                .first()
                .copied()
                .filter(|v| v.is_finite())
                .unwrap_or(0.0),
            Err(err) => {
                warn!(%err, "trend projection failed");
                0.0
            }
        }
    }
}

/// Replay every archived sheet into a fresh workbook.
fn write_workbook(path: &Path, archive: &SheetArchive, layout: &Layout) -> Result<()> {
    let mut workbook = Workbook::new();
    for sheet in archive.sheets() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        worksheet.set_column_width(0, layout.label_column_width)?;
        for col in 1..layout.sheet_columns {
            worksheet.set_column_width(col, layout.column_width)?;
        }
        for cell in &sheet.cells {
            worksheet.write_string_with_format(
                cell.row,
                cell.col,
                &cell.value,
                &format_for(cell.style),
            )?;
        }
        for merge in &sheet.merges {
            worksheet.merge_range(
                merge.first_row,
                merge.first_col,
                merge.last_row,
                merge.last_col,
                &merge.value,
                &format_for(merge.style),
            )?;
        }
    }
    workbook.save(path)?;
    Ok(())
}

fn push(cells: &mut Vec<CellRecord>, row: u32, col: u16, value: impl Into<String>, style: CellStyle) {
    cells.push(CellRecord {
        row,
        col,
        value: value.into(),
        style,
    });
}

/// Subheader row plus body rows; first column is the label column.
fn table(cells: &mut Vec<CellRecord>, row: u32, cols: &[u16], headers: &[&str], rows: &[Vec<String>]) {
    for (i, header) in headers.iter().enumerate() {
        push(cells, row, cols[i], *header, CellStyle::Subheader);
    }
    for (r, body_row) in rows.iter().enumerate() {
        for (c, value) in body_row.iter().enumerate() {
            let style = if c == 0 { CellStyle::Label } else { CellStyle::Value };
            push(cells, row + 1 + r as u32, cols[c], value.clone(), style);
        }
    }
}

/// Last value of a row, zero when the row is absent or not finite.
fn last_or_zero(table: &StatementTable, label: &str) -> f64 {
    table
        .row(label)
        .and_then(|row| row.last().copied())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Mean over the finite values of a row, zero when none.
fn mean_or_zero(table: &StatementTable, label: &str) -> f64 {
    let Some(row) = table.row(label) else {
        return 0.0;
    };
    let finite: Vec<f64> = row.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        0.0
    } else {
        finite.iter().sum::<f64>() / finite.len() as f64
    }
}

/// Mean, max and min over the finite values of a row; zeros when none.
fn row_stats(table: &StatementTable, label: &str) -> (f64, f64, f64) {
    let Some(row) = table.row(label) else {
        return (0.0, 0.0, 0.0);
    };
    let finite: Vec<f64> = row.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let mean = finite.iter().sum::<f64>() / finite.len() as f64;
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    (mean, max, min)
}

/// Period-over-period fractional changes of a level row, year-indexed.
fn pct_change_series(table: &StatementTable, label: &str) -> PeriodSeries {
    let Some(row) = table.row(label) else {
        return PeriodSeries::new([]);
    };
    let years: Vec<Option<i32>> = table.periods().iter().map(|p| parse_year(p)).collect();
    let mut pairs = Vec::new();
    for i in 1..row.len() {
        let (previous, current) = (row[i - 1], row[i]);
        if let Some(Some(year)) = years.get(i) {
            if previous.is_finite() && current.is_finite() && previous != 0.0 {
                pairs.push((*year, (current - previous) / previous.abs()));
            }
        }
    }
    PeriodSeries::new(pairs)
}

fn series_mean(series: &PeriodSeries) -> f64 {
    if series.is_empty() { 0.0 } else { series.mean() }
}

/// Format with thousands separators and fixed decimals; `NaN` passes
/// through as text.
fn thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "NaN".to_string();
    }
    let rounded = format!("{:.*}", decimals, value);
    let (sign, digits) = rounded
        .strip_prefix('-')
        .map_or(("", rounded.as_str()), |rest| ("-", rest));
    let (int_part, frac_part) = digits
        .split_once('.')
        .map_or((digits, None), |(i, f)| (i, Some(f)));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

fn fmt_basic(value: f64) -> String {
    thousands(value, 0)
}

fn fmt_decimal(value: f64) -> String {
    thousands(value, 2)
}

fn fmt_dollar_basic(value: f64) -> String {
    format!("${}", thousands(value, 0))
}

fn fmt_dollar_decimal(value: f64) -> String {
    format!("${}", thousands(value, 2))
}

fn fmt_pct(value: f64) -> String {
    format!("{}%", thousands(value, 2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tearsheet_data::StatementTable;
    use tempfile::tempdir;

    fn statement_table(rows: &[(&str, &[f64])]) -> StatementTable {
        StatementTable::new(
            vec!["2020".to_string(), "2021".to_string(), "2022".to_string()],
            rows.iter()
                .map(|(label, values)| (label.to_string(), values.to_vec()))
                .collect(),
        )
    }

    fn statements() -> StatementSet {
        StatementSet {
            income_statement: statement_table(&[
                ("Revenue", &[100.0, 110.0, 120.0]),
                ("Operating Income", &[20.0, 22.0, 24.0]),
                ("Net Income", &[10.0, 12.0, 14.0]),
                ("EPS (Basic)", &[1.0, 1.2, 1.4]),
                ("Shares Outstanding (Basic)", &[10.0, 10.0, 10.0]),
                ("Gross Margin", &[0.4, 0.4, 0.4]),
                ("Operating Margin", &[0.2, 0.2, 0.2]),
                ("Profit Margin", &[0.1, 0.1, 0.1]),
                ("Free Cash Flow Margin", &[0.08, 0.08, 0.08]),
                ("Revenue Growth (YoY)", &[f64::NAN, 0.10, 0.0909]),
            ]),
            balance_sheet: statement_table(&[("Shareholders' Equity", &[50.0, 55.0, 60.0])]),
            cash_flow: statement_table(&[
                ("Free Cash Flow", &[8.0, 9.0, 10.0]),
                ("Dividends Paid", &[-2.0, -2.0, -2.0]),
            ]),
            ratios: statement_table(&[
                ("PS Ratio", &[2.0, 2.0, 2.0]),
                ("PE Ratio", &[20.0, 22.0, 24.0]),
                ("PB Ratio", &[4.0, 4.0, 4.0]),
                ("P/FCF Ratio", &[25.0, 25.0, 25.0]),
                ("EV/FCF Ratio", &[20.0, 21.0, 22.0]),
                ("Market Capitalization", &[200.0, 220.0, 240.0]),
            ]),
        }
    }

    fn profile() -> CompanyProfile {
        CompanyProfile {
            symbol: "ACME".to_string(),
            name: "Acme Corp".to_string(),
            exchange: "NYSE".to_string(),
            sector: "Industrials".to_string(),
            industry: "Machinery".to_string(),
            country: "USA".to_string(),
            description: "Acme makes everything.".to_string(),
            high_52w: Some(210.0),
            low_52w: Some(140.0),
            shares_outstanding: Some(10_000_000.0),
            ..CompanyProfile::default()
        }
    }

    fn quote() -> QuoteSummary {
        QuoteSummary {
            symbol: "ACME".to_string(),
            price: Some(189.95),
            volume: Some(48_000_000.0),
        }
    }

    fn renderer(out_dir: &std::path::Path) -> TearsheetRenderer {
        TearsheetRenderer::new(
            out_dir,
            LinearTrendModel::default(),
            ValuationEngine::default(),
        )
    }

    fn cell<'a>(sheet: &'a Sheet, row: u32, col: u16) -> &'a str {
        sheet
            .cells
            .iter()
            .find(|c| c.row == row && c.col == col)
            .map(|c| c.value.as_str())
            .unwrap_or_else(|| panic!("no cell at ({row}, {col})"))
    }

    #[test]
    fn test_thousands_grouping() {
        assert_eq!(fmt_basic(1_234_567.0), "1,234,567");
        assert_eq!(fmt_decimal(-1234.5), "-1,234.50");
        assert_eq!(fmt_dollar_decimal(26.0), "$26.00");
        assert_eq!(fmt_dollar_basic(-5.0), "$-5");
        assert_eq!(fmt_pct(25.0), "25.00%");
        assert_eq!(fmt_decimal(f64::NAN), "NaN");
    }

    #[test]
    fn test_banner_uses_company_name() {
        let dir = tempdir().unwrap();
        let sheet = renderer(dir.path()).build_sheet(
            "ACME",
            &statements(),
            Some(&profile()),
            Some(&quote()),
            "2026-08-23".to_string(),
        );
        assert_eq!(cell(&sheet, 0, 0), "Acme Corp");
    }

    #[test]
    fn test_market_profile_values() {
        let dir = tempdir().unwrap();
        let sheet = renderer(dir.path()).build_sheet(
            "ACME",
            &statements(),
            Some(&profile()),
            Some(&quote()),
            "2026-08-23".to_string(),
        );
        // Body starts one row under the subheader at row 1.
        assert_eq!(cell(&sheet, 2, 0), "Closing Price");
        assert_eq!(cell(&sheet, 2, 1), "$189.95");
        assert_eq!(cell(&sheet, 5, 1), "10"); // shares in millions
        assert_eq!(cell(&sheet, 7, 1), "240"); // marketcap
        // abs(-2) / 240 = 0.83%
        assert_eq!(cell(&sheet, 17, 0), "Dividend Yield");
        assert_eq!(cell(&sheet, 17, 1), "0.83%");
    }

    #[test]
    fn test_missing_profile_and_quote_render_zeros() {
        let dir = tempdir().unwrap();
        let sheet = renderer(dir.path()).build_sheet(
            "ACME",
            &statements(),
            None,
            None,
            "2026-08-23".to_string(),
        );
        assert_eq!(cell(&sheet, 0, 0), "ACME");
        assert_eq!(cell(&sheet, 2, 1), "$0.00");
        assert_eq!(cell(&sheet, 9, 1), "NaN"); // beta stays a literal
    }

    #[test]
    fn test_key_financials_projection() {
        let dir = tempdir().unwrap();
        let sheet = renderer(dir.path()).build_sheet(
            "ACME",
            &statements(),
            Some(&profile()),
            Some(&quote()),
            "2026-08-23".to_string(),
        );
        // Revenue rises 10/yr, so the first projected step is 130.
        assert_eq!(cell(&sheet, 19, 0), "Revenue (Mil)");
        assert_eq!(cell(&sheet, 19, 1), "$120");
        assert_eq!(cell(&sheet, 19, 2), "$130");
        // No dividend row: both columns zero.
        assert_eq!(cell(&sheet, 24, 1), "$0.00");
        assert_eq!(cell(&sheet, 24, 2), "$0.00");
    }

    #[test]
    fn test_valuation_method_weights_and_total() {
        let dir = tempdir().unwrap();
        let sheet = renderer(dir.path()).build_sheet(
            "ACME",
            &statements(),
            Some(&profile()),
            Some(&quote()),
            "2026-08-23".to_string(),
        );
        assert_eq!(cell(&sheet, 26, 0), "Revenue");
        assert_eq!(cell(&sheet, 26, 1), "25.00%");
        // Revenue path: trend ends at 150, PS average 2, 10 shares.
        assert_eq!(cell(&sheet, 26, 2), "$30.00");
        assert_eq!(cell(&sheet, 30, 0), "Implied Value:");
        assert_eq!(cell(&sheet, 30, 1), "100.00%");
    }

    #[test]
    fn test_highlights_merge_block() {
        let dir = tempdir().unwrap();
        let sheet = renderer(dir.path()).build_sheet(
            "ACME",
            &statements(),
            Some(&profile()),
            Some(&quote()),
            "2026-08-23".to_string(),
        );
        assert_eq!(sheet.merges.len(), 1);
        let merge = &sheet.merges[0];
        assert_eq!(merge.first_row, 6);
        assert_eq!(merge.last_row, 17);
        assert_eq!((merge.first_col, merge.last_col), (2, 5));
        assert_eq!(merge.value, "Acme makes everything.");
    }

    #[test]
    fn test_historical_ratio_stats() {
        let dir = tempdir().unwrap();
        let sheet = renderer(dir.path()).build_sheet(
            "ACME",
            &statements(),
            Some(&profile()),
            Some(&quote()),
            "2026-08-23".to_string(),
        );
        // PE Ratio 20/22/24 -> mean 22, high 24, low 20.
        assert_eq!(cell(&sheet, 27, 3), "Price-to-Earnings");
        assert_eq!(cell(&sheet, 27, 4), "22.00");
        assert_eq!(cell(&sheet, 27, 5), "24.00");
        assert_eq!(cell(&sheet, 27, 6), "20.00");
    }

    #[test]
    fn test_render_preserves_other_dates() {
        let dir = tempdir().unwrap();
        let renderer = renderer(dir.path());
        let statements = statements();

        let first = NaiveDate::from_ymd_opt(2026, 8, 22).unwrap();
        let second = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        let path = renderer
            .render_dated("acme", &statements, Some(&profile()), Some(&quote()), first)
            .unwrap();
        renderer
            .render_dated("acme", &statements, Some(&profile()), Some(&quote()), second)
            .unwrap();
        // Same-date rerun replaces its sheet instead of adding one.
        renderer
            .render_dated("acme", &statements, Some(&profile()), Some(&quote()), second)
            .unwrap();

        assert!(path.exists());
        assert!(path.ends_with("ACME_tearsheet.xlsx"));
        let archive =
            SheetArchive::load(&dir.path().join("ACME_tearsheet.sheets.json")).unwrap();
        assert_eq!(archive.len(), 2);
    }

    #[test]
    fn test_pct_change_series_skips_zero_base() {
        let table = statement_table(&[("Net Income", &[0.0, 10.0, 12.0])]);
        let series = pct_change_series(&table, "Net Income");
        // Only the 2021 -> 2022 step survives the zero base.
        assert_eq!(series.len(), 1);
    }
}
