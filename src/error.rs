// src/error.rs
//! Typed failures for the market-data path.
//!
//! `SourceError` is what a single upstream attempt can fail with; the retry loop
//! classifies it as retryable (`RateLimited`) or terminal (`Request`).
//! `PriceError` is the terminal outcome handed to callers. Its `Display` is the
//! user-facing message.

use thiserror::Error;

/// Failure of one upstream request attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Upstream answered HTTP 429.
    #[error("rate limited by upstream")]
    RateLimited,

    /// Anything else at the request level (connect, non-2xx, decode).
    #[error("request failed: {0}")]
    Request(String),
}

/// Terminal outcome of a price query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("Rate limit exceeded. Try again later")]
    RateLimited,

    #[error("Current price for {symbol} is not available")]
    Unavailable { symbol: String },

    #[error("Historical data for {symbol} is not available")]
    HistoryUnavailable { symbol: String },

    #[error("Failed to fetch stock data for {symbol}")]
    Request { symbol: String },

    #[error("Timed out fetching stock data for {symbol}")]
    DeadlineExceeded { symbol: String },
}

impl PriceError {
    /// Stable short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PriceError::RateLimited => "rate_limited",
            PriceError::Unavailable { .. } => "unavailable",
            PriceError::HistoryUnavailable { .. } => "history_unavailable",
            PriceError::Request { .. } => "request",
            PriceError::DeadlineExceeded { .. } => "deadline",
        }
    }
}
