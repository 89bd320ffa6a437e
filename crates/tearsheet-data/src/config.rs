//! Configuration for scraping, caching and quote lookups.

use std::path::PathBuf;
use std::time::Duration;

/// Default politeness delay between page fetches.
const DEFAULT_FETCH_DELAY: Duration = Duration::from_secs(2);

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings shared by the extractor, cache and quote provider.
///
/// Everything path- or endpoint-shaped lives here so callers inject it
/// once instead of each component hard-coding its own.
#[derive(Debug, Clone)]
pub struct DataConfig {
    /// Root directory of the statement cache.
    pub dataset_root: PathBuf,
    /// Base URL of the statements site.
    pub site_base_url: String,
    /// Base URL of the quote provider API.
    pub quote_base_url: String,
    /// Quote provider API key, if configured.
    pub quote_api_key: Option<String>,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Minimum delay before each page fetch.
    pub fetch_delay: Duration,
}

impl DataConfig {
    /// Environment variable holding the quote provider API key.
    pub const API_KEY_VAR: &'static str = "TEARSHEET_QUOTE_API_KEY";

    /// Build a config rooted at an explicit dataset directory.
    pub fn with_root(dataset_root: impl Into<PathBuf>) -> Self {
        Self {
            dataset_root: dataset_root.into(),
            ..Self::default()
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        let dataset_root = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tearsheet")
            .join("statements");

        Self {
            dataset_root,
            site_base_url: "https://stockanalysis.com".to_string(),
            quote_base_url: "https://www.alphavantage.co".to_string(),
            quote_api_key: std::env::var(Self::API_KEY_VAR).ok(),
            timeout: DEFAULT_TIMEOUT,
            fetch_delay: DEFAULT_FETCH_DELAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_root_overrides_dataset_path() {
        let config = DataConfig::with_root("/tmp/statements");
        assert_eq!(config.dataset_root, PathBuf::from("/tmp/statements"));
        assert!(config.site_base_url.starts_with("https://"));
    }

    #[test]
    fn test_default_has_nonzero_delay() {
        let config = DataConfig::default();
        assert!(config.fetch_delay > Duration::ZERO);
    }
}
