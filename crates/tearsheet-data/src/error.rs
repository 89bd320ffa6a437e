//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Invalid ticker symbol
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Neither page layout produced any table headers
    #[error("Empty table for {symbol}: {url}")]
    EmptyTable {
        /// Symbol that was scraped
        symbol: String,
        /// Page that was fetched
        url: String,
    },

    /// Quote provider signalled a request quota violation
    #[error("Quote provider rate limit: {message}")]
    RateLimited {
        /// Provider-supplied explanation
        message: String,
    },

    /// Quote provider API key is not configured
    #[error("Quote provider API key not configured")]
    MissingApiKey,

    /// Upstream HTTP error
    #[error("HTTP error: {0}")]
    Http(String),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
