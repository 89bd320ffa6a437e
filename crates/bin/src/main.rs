//! Tearsheet CLI binary.
//!
//! Scrapes financial statements into the local cache, compares line
//! items across tickers, prints forecasts and renders Excel tearsheets.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::process;
use tearsheet_data::quotes::QuoteProvider;
use tearsheet_data::scrape::{HttpFetcher, TableExtractor};
use tearsheet_data::{DataConfig, Frequency, Statement, StatementCache};
use tearsheet_forecast::{ArimaModel, LinearTrendModel, PeriodSeries};
use tearsheet_output::TearsheetRenderer;
use tearsheet_valuation::{Category, Comparator, ValuationEngine};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tearsheet")]
#[command(about = "Statement scraping, forecasting and tearsheet reports", long_about = None)]
#[command(version)]
struct Cli {
    /// Root directory of the statement cache
    #[arg(long, global = true)]
    dataset_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Populate the statement cache for a ticker
    Scrape {
        /// Ticker symbol
        symbol: String,

        /// Reporting frequency (annual or quarterly)
        #[arg(long, default_value = "annual")]
        freq: String,

        /// Re-scrape statements even when cached
        #[arg(long)]
        refresh: bool,
    },

    /// Render the Excel tearsheet for a ticker
    Tearsheet {
        /// Ticker symbol
        symbol: String,

        /// Reporting frequency (annual or quarterly)
        #[arg(long, default_value = "annual")]
        freq: String,

        /// Trailing periods used for fits and averages
        #[arg(long, default_value = "5")]
        review_period: usize,

        /// Future periods to project
        #[arg(long, default_value = "3")]
        horizon: usize,

        /// Forecast the valuation multiple instead of averaging it
        #[arg(long)]
        predict_multiple: bool,

        /// Forecast the share count instead of averaging it
        #[arg(long)]
        predict_shares: bool,

        /// Output directory for the workbook
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Compare a line item across tickers
    Compare {
        /// Ticker symbols
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Comparison category (growth, ratios or yields)
        #[arg(long)]
        category: String,

        /// Item key within the category, e.g. p/e
        #[arg(long)]
        item: String,

        /// Reporting frequency (annual or quarterly)
        #[arg(long, default_value = "annual")]
        freq: String,
    },

    /// Print a forecast for one statement row
    Forecast {
        /// Ticker symbol
        symbol: String,

        /// Statement the row lives in (income, balance, cashflow, ratios)
        #[arg(long)]
        statement: String,

        /// Row label, e.g. "Revenue"
        #[arg(long)]
        row: String,

        /// Use the ARIMA model instead of the linear trend
        #[arg(long)]
        arima: bool,

        /// Fit the undifferenced ARIMA over the trailing review window
        #[arg(long, requires = "arima")]
        stationary: bool,

        /// Future periods to project
        #[arg(long, default_value = "3")]
        horizon: usize,

        /// Trailing periods used for the trend fit
        #[arg(long, default_value = "5")]
        review_period: usize,

        /// Reporting frequency (annual or quarterly)
        #[arg(long, default_value = "annual")]
        freq: String,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = cli
        .dataset_root
        .clone()
        .map_or_else(DataConfig::default, DataConfig::with_root);

    match cli.command {
        Commands::Scrape {
            symbol,
            freq,
            refresh,
        } => scrape(&config, &symbol, &freq, refresh).await,
        Commands::Tearsheet {
            symbol,
            freq,
            review_period,
            horizon,
            predict_multiple,
            predict_shares,
            out,
        } => {
            let engine = ValuationEngine {
                review_period,
                horizon,
                predict_multiple,
                predict_shares,
            };
            tearsheet(&config, &symbol, &freq, engine, out).await
        }
        Commands::Compare {
            symbols,
            category,
            item,
            freq,
        } => compare(&config, &symbols, &category, &item, &freq).await,
        Commands::Forecast {
            symbol,
            statement,
            row,
            arima,
            stationary,
            horizon,
            review_period,
            freq,
        } => {
            forecast(
                &config,
                &symbol,
                &statement,
                &row,
                arima,
                stationary,
                horizon,
                review_period,
                &freq,
            )
            .await
        }
    }
}

async fn scrape(
    config: &DataConfig,
    symbol: &str,
    freq: &str,
    refresh: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let frequency = Frequency::from_str_loose(freq)?;
    let symbol = symbol.to_uppercase();
    let cache = StatementCache::new(config.clone());
    let extractor = TableExtractor::new(HttpFetcher::new(config)?, config);

    println!("Scraping {} ({} statements)\n", symbol, frequency.folder());
    for statement in Statement::ALL {
        if refresh {
            cache.invalidate(&symbol, statement, frequency)?;
        }
        print!("  {}...", statement.file_stem());
        std::io::Write::flush(&mut std::io::stdout())?;
        let table = cache
            .load_or_scrape(&extractor, &symbol, statement, frequency)
            .await?;
        println!(" ✓ ({} rows, {} periods)", table.height(), table.width());
    }
    println!("\nCached under {}", config.dataset_root.display());
    Ok(())
}

async fn tearsheet(
    config: &DataConfig,
    symbol: &str,
    freq: &str,
    engine: ValuationEngine,
    out: PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let frequency = Frequency::from_str_loose(freq)?;
    let symbol = symbol.to_uppercase();
    let cache = StatementCache::new(config.clone());
    let extractor = TableExtractor::new(HttpFetcher::new(config)?, config);

    print!("Loading statements for {}...", symbol);
    std::io::Write::flush(&mut std::io::stdout())?;
    let statements = cache.load_all(&extractor, &symbol, frequency).await?;
    println!(" ✓");

    // Quote data is best-effort; the sheet renders placeholders without it.
    let provider = QuoteProvider::new(config)?;
    let profile = match provider.company_profile(&symbol).await {
        Ok(profile) => Some(profile),
        Err(e) => {
            eprintln!("Company profile unavailable: {}", e);
            None
        }
    };
    let quote = match provider.quote_summary(&symbol).await {
        Ok(quote) => Some(quote),
        Err(e) => {
            eprintln!("Quote unavailable: {}", e);
            None
        }
    };

    let model = LinearTrendModel::new(engine.review_period, engine.horizon);
    let renderer = TearsheetRenderer::new(out, model, engine);
    let path = renderer.render(&symbol, &statements, profile.as_ref(), quote.as_ref())?;
    println!("Wrote {}", path.display());
    Ok(())
}

async fn compare(
    config: &DataConfig,
    symbols: &[String],
    category: &str,
    item: &str,
    freq: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let frequency = Frequency::from_str_loose(freq)?;
    let category = Category::from_str_loose(category)?;
    let cache = StatementCache::new(config.clone());
    let extractor = TableExtractor::new(HttpFetcher::new(config)?, config);

    let pb = ProgressBar::new(symbols.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template")
            .progress_chars("█▓░"),
    );

    let mut data = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let symbol = symbol.to_uppercase();
        pb.set_message(symbol.clone());
        let set = cache.load_all(&extractor, &symbol, frequency).await?;
        data.push((symbol, set));
        pb.inc(1);
    }
    pb.finish_and_clear();

    let mut comparator = Comparator::new(data);
    let table = comparator.compare(category, item)?;

    println!("{}\n", table.label);
    for column in &table.columns {
        println!("{}", column.ticker);
        for (period, value) in column.periods.iter().zip(&column.values) {
            println!("  {:<16} {:>12}", period, value);
        }
        println!();
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn forecast(
    config: &DataConfig,
    symbol: &str,
    statement: &str,
    row: &str,
    arima: bool,
    stationary: bool,
    horizon: usize,
    review_period: usize,
    freq: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let frequency = Frequency::from_str_loose(freq)?;
    let statement = Statement::from_str_loose(statement)?;
    let symbol = symbol.to_uppercase();
    let cache = StatementCache::new(config.clone());
    let extractor = TableExtractor::new(HttpFetcher::new(config)?, config);

    let table = cache
        .load_or_scrape(&extractor, &symbol, statement, frequency)
        .await?;
    let series = PeriodSeries::from_table_row(&table, row)?;

    if arima {
        // The undifferenced model assumes a stable level, so it only
        // sees the trailing review window and projects across it.
        let (model, window, fallback_steps) = if stationary {
            (
                ArimaModel::stationary(),
                series.tail(review_period),
                review_period,
            )
        } else {
            (
                ArimaModel::standard(),
                series.clone(),
                ArimaModel::default_steps(frequency),
            )
        };
        let steps = if horizon == 0 { fallback_steps } else { horizon };
        let values = model.forecast(&window, steps)?;
        let base_year = window.last_year().unwrap_or(0);

        println!("ARIMA forecast for '{}' ({})\n", row, symbol);
        for (i, value) in values.iter().enumerate() {
            println!("  {}  {:>14.2}", base_year + 1 + i as i32, value);
        }
    } else {
        let model = LinearTrendModel::new(review_period, horizon);
        let forecast = model.forecast(&series)?;

        println!("Linear trend forecast for '{}' ({})\n", row, symbol);
        println!("  {:<6} {:>14} {:>18}", "Year", "Trend", "Growth-adjusted");
        for (i, year) in forecast.years.iter().enumerate() {
            println!(
                "  {:<6} {:>14.2} {:>18.2}",
                year, forecast.trend[i], forecast.with_features[i]
            );
        }
    }
    Ok(())
}
