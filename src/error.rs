//! Unified error types for the quoting bot.

use thiserror::Error;

use crate::market::Leg;

/// Unified error type for the quoting bot.
#[derive(Error, Debug)]
pub enum BotError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Market-data read error.
    #[error("market error: {0}")]
    Market(#[from] MarketError),

    /// Quote evaluation/pricing error.
    #[error("quote error: {0}")]
    Quote(#[from] QuoteError),

    /// Trading/order error.
    #[error("trading error: {0}")]
    Trading(#[from] TradingError),

    /// HTTP request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Market-data read errors. All of these are transient: the affected key is
/// skipped for the tick and retried on the next one.
#[derive(Error, Debug)]
pub enum MarketError {
    /// Failed to fetch data for a ticker.
    #[error("failed to fetch {what} for {ticker}: {reason}")]
    FetchFailed {
        /// What was being fetched (orderbook, positions, orders).
        what: &'static str,
        /// The ticker that failed.
        ticker: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to parse a feed response.
    #[error("failed to parse market data: {0}")]
    ParseError(String),

    /// HTTP request failed.
    #[error("http request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Quote evaluation and sweep pricing errors.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// The required book side has no resting liquidity. A sweep must be
    /// refused outright rather than priced at zero.
    #[error("no liquidity on the {leg} ask side of {ticker}")]
    NoLiquidity {
        /// The market ticker.
        ticker: String,
        /// The leg being bought.
        leg: Leg,
    },

    /// A price fell outside the valid 1..=99 cent range.
    #[error("price {0} outside valid range 1..=99")]
    InvalidPrice(u32),
}

/// Trading and order execution errors.
#[derive(Error, Debug)]
pub enum TradingError {
    /// Order submission failed.
    #[error("order submission failed: {0}")]
    SubmissionFailed(String),

    /// Order rejected by the venue.
    #[error("order rejected: {reason}")]
    OrderRejected {
        /// Rejection reason from the venue.
        reason: String,
    },

    /// Failed to cancel order.
    #[error("failed to cancel order {order_id}: {reason}")]
    CancelFailed {
        /// Order ID that failed to cancel.
        order_id: String,
        /// Reason for failure.
        reason: String,
    },

    /// Invalid order parameters.
    #[error("invalid order parameters: {0}")]
    InvalidParams(String),

    /// Rate limited by the API.
    #[error("rate limited: retry after {retry_after_seconds}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_seconds: u64,
    },
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, BotError>;
