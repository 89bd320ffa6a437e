//! Company profile and quote lookups.
//!
//! Backed by an Alpha-Vantage-style JSON API. The provider answers a
//! quota violation with HTTP 200 and an `"Information"` message instead
//! of data; that case surfaces as [`DataError::RateLimited`] so callers
//! can tell a throttled request apart from a ticker with no data.

use crate::config::DataConfig;
use crate::error::{DataError, Result};
use serde_json::Value;
use tracing::debug;

/// Descriptive company metadata and slow-moving market data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyProfile {
    /// Ticker symbol
    pub symbol: String,
    /// Company long name
    pub name: String,
    /// Listing exchange
    pub exchange: String,
    /// GICS-style sector
    pub sector: String,
    /// Industry
    pub industry: String,
    /// Country of domicile
    pub country: String,
    /// Long business description
    pub description: String,
    /// Market capitalization
    pub market_cap: Option<f64>,
    /// Shares outstanding
    pub shares_outstanding: Option<f64>,
    /// Trailing P/E ratio
    pub pe_ratio: Option<f64>,
    /// Trailing twelve-month EPS
    pub eps: Option<f64>,
    /// Dividend yield (fraction)
    pub dividend_yield: Option<f64>,
    /// Beta vs the market
    pub beta: Option<f64>,
    /// 52-week high
    pub high_52w: Option<f64>,
    /// 52-week low
    pub low_52w: Option<f64>,
}

/// Latest traded price and volume.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuoteSummary {
    /// Ticker symbol
    pub symbol: String,
    /// Latest close price
    pub price: Option<f64>,
    /// Latest session volume
    pub volume: Option<f64>,
}

impl CompanyProfile {
    /// Build from an `OVERVIEW` response body.
    pub fn from_overview(symbol: &str, body: &Value) -> Result<Self> {
        ensure_not_rate_limited(body)?;
        Ok(Self {
            symbol: symbol.to_uppercase(),
            name: text_field(body, "Name"),
            exchange: text_field(body, "Exchange"),
            sector: text_field(body, "Sector"),
            industry: text_field(body, "Industry"),
            country: text_field(body, "Country"),
            description: text_field(body, "Description"),
            market_cap: numeric_field(body, "MarketCapitalization"),
            shares_outstanding: numeric_field(body, "SharesOutstanding"),
            pe_ratio: numeric_field(body, "PERatio"),
            eps: numeric_field(body, "EPS"),
            dividend_yield: numeric_field(body, "DividendYield"),
            beta: numeric_field(body, "Beta"),
            high_52w: numeric_field(body, "52WeekHigh"),
            low_52w: numeric_field(body, "52WeekLow"),
        })
    }
}

impl QuoteSummary {
    /// Build from a `GLOBAL_QUOTE` response body.
    pub fn from_global_quote(symbol: &str, body: &Value) -> Result<Self> {
        ensure_not_rate_limited(body)?;
        let quote = body.get("Global Quote").unwrap_or(&Value::Null);
        Ok(Self {
            symbol: symbol.to_uppercase(),
            price: numeric_field(quote, "05. price"),
            volume: numeric_field(quote, "06. volume"),
        })
    }
}

/// Error when the body is a quota message rather than data.
fn ensure_not_rate_limited(body: &Value) -> Result<()> {
    if let Some(message) = body.get("Information").and_then(Value::as_str) {
        return Err(DataError::RateLimited {
            message: message.to_string(),
        });
    }
    Ok(())
}

fn text_field(body: &Value, key: &str) -> String {
    body.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Numbers arrive as strings; `"None"` and `"-"` mean absent.
fn numeric_field(body: &Value, key: &str) -> Option<f64> {
    body.get(key)
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// JSON quote API client.
#[derive(Debug)]
pub struct QuoteProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl QuoteProvider {
    /// Build a provider from the injected config.
    pub fn new(config: &DataConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(DataError::Network)?;
        Ok(Self {
            client,
            base_url: config.quote_base_url.trim_end_matches('/').to_string(),
            api_key: config.quote_api_key.clone(),
        })
    }

    async fn query(&self, function: &str, symbol: &str) -> Result<Value> {
        let key = self.api_key.as_deref().ok_or(DataError::MissingApiKey)?;
        let url = format!(
            "{}/query?function={}&symbol={}&apikey={}",
            self.base_url,
            function,
            symbol.to_uppercase(),
            key
        );
        debug!(function, symbol, "quote provider request");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(DataError::Http(format!(
                "Quote provider returned HTTP {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }

    /// Fetch the company profile for a ticker.
    pub async fn company_profile(&self, symbol: &str) -> Result<CompanyProfile> {
        let body = self.query("OVERVIEW", symbol).await?;
        CompanyProfile::from_overview(symbol, &body)
    }

    /// Fetch the latest quote for a ticker.
    pub async fn quote_summary(&self, symbol: &str) -> Result<QuoteSummary> {
        let body = self.query("GLOBAL_QUOTE", symbol).await?;
        QuoteSummary::from_global_quote(symbol, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_from_overview() {
        let body = json!({
            "Name": "Apple Inc",
            "Exchange": "NASDAQ",
            "Sector": "TECHNOLOGY",
            "Industry": "ELECTRONIC COMPUTERS",
            "Country": "USA",
            "Description": "Apple Inc. designs consumer electronics.",
            "MarketCapitalization": "3000000000000",
            "SharesOutstanding": "15500000000",
            "PERatio": "29.5",
            "EPS": "6.42",
            "DividendYield": "0.0055",
            "Beta": "1.25",
            "52WeekHigh": "199.62",
            "52WeekLow": "124.17"
        });

        let profile = CompanyProfile::from_overview("aapl", &body).unwrap();
        assert_eq!(profile.symbol, "AAPL");
        assert_eq!(profile.name, "Apple Inc");
        assert_eq!(profile.market_cap, Some(3.0e12));
        assert_eq!(profile.eps, Some(6.42));
    }

    #[test]
    fn test_profile_tolerates_missing_fields() {
        let body = json!({ "Name": "Sparse Corp", "PERatio": "None" });
        let profile = CompanyProfile::from_overview("SPRS", &body).unwrap();
        assert_eq!(profile.name, "Sparse Corp");
        assert!(profile.pe_ratio.is_none());
        assert!(profile.market_cap.is_none());
    }

    #[test]
    fn test_quote_from_global_quote() {
        let body = json!({
            "Global Quote": {
                "01. symbol": "AAPL",
                "05. price": "189.95",
                "06. volume": "48087681"
            }
        });
        let quote = QuoteSummary::from_global_quote("AAPL", &body).unwrap();
        assert_eq!(quote.price, Some(189.95));
        assert_eq!(quote.volume, Some(48_087_681.0));
    }

    #[test]
    fn test_information_body_is_rate_limited() {
        let body = json!({
            "Information": "Thank you for using our API. Your plan is limited to 25 requests per day."
        });
        let result = CompanyProfile::from_overview("AAPL", &body);
        assert!(matches!(result, Err(DataError::RateLimited { .. })));

        let result = QuoteSummary::from_global_quote("AAPL", &body);
        assert!(matches!(result, Err(DataError::RateLimited { .. })));
    }
}
