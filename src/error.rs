//! Unified error types for the alert bot.

use thiserror::Error;

/// Unified error type for the alert bot.
#[derive(Error, Debug)]
pub enum BotError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Market data error.
    #[error("market error: {0}")]
    Market(#[from] MarketError),

    /// Notification error.
    #[error("notify error: {0}")]
    Notify(#[from] NotifyError),
}

/// Market data errors: symbol directories, quote snapshots and daily bars.
#[derive(Error, Debug)]
pub enum MarketError {
    /// A symbol directory could not be downloaded. Aborts a universe rebuild.
    #[error("failed to fetch listing {url}: {reason}")]
    ListingFetchFailed {
        /// Listing URL.
        url: String,
        /// Reason for failure.
        reason: String,
    },

    /// Quote snapshot lookup failed for one symbol.
    #[error("quote lookup failed for {symbol}: {reason}")]
    QuoteFailed {
        /// Symbol being looked up.
        symbol: String,
        /// Reason for failure.
        reason: String,
    },

    /// Daily bar history fetch failed for one symbol.
    #[error("history fetch failed for {symbol}: {reason}")]
    HistoryFailed {
        /// Symbol being fetched.
        symbol: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to parse market data.
    #[error("failed to parse market data: {0}")]
    ParseError(String),

    /// Malformed delimited listing.
    #[error("listing parse error: {0}")]
    Csv(#[from] csv::Error),

    /// Endpoint URL could not be built.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// HTTP request failed.
    #[error("http request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Notification delivery errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The messaging API answered with a non-success status.
    #[error("Telegram error: HTTP {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body as returned by the API.
        body: String,
    },

    /// The request never completed. Built without the request URL, which holds the token.
    #[error("Telegram send failed: {0}")]
    Transport(reqwest::Error),

    /// Endpoint URL could not be built.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, BotError>;
