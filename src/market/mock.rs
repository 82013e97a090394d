//! In-memory market data for unit testing.
//!
//! Lets the universe builder, scanner and poller run without making real
//! network requests.

use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::source::MarketDataSource;
use super::types::Bar;
use crate::error::MarketError;

/// Mock market data source.
#[derive(Debug, Clone, Default)]
pub struct MockMarketData {
    /// Listing symbols by URL.
    listings: HashMap<String, Vec<String>>,
    /// Listing URLs that fail to download.
    failing_listings: HashSet<String>,
    /// Snapshot prices by symbol (`None` = provider has no price).
    prices: HashMap<String, Option<Decimal>>,
    /// Daily bars by symbol.
    histories: HashMap<String, Vec<Bar>>,
    /// Symbols whose every lookup fails.
    failing_symbols: HashSet<String>,
    /// Delay before each listing download completes.
    listing_latency: Option<Duration>,
    /// Symbols requested so far, in order.
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockMarketData {
    /// Create an empty mock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `symbols` for `url`.
    pub fn with_listing(mut self, url: &str, symbols: &[&str]) -> Self {
        self.listings.insert(
            url.to_string(),
            symbols.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    /// Fail downloads of `url`.
    pub fn with_failing_listing(mut self, url: &str) -> Self {
        self.failing_listings.insert(url.to_string());
        self
    }

    /// Set the snapshot price for `symbol`.
    pub fn with_price(mut self, symbol: &str, price: Option<Decimal>) -> Self {
        self.prices.insert(symbol.to_string(), price);
        self
    }

    /// Set the daily bars for `symbol`.
    pub fn with_history(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.histories.insert(symbol.to_string(), bars);
        self
    }

    /// Make every lookup for `symbol` fail.
    pub fn with_failing_symbol(mut self, symbol: &str) -> Self {
        self.failing_symbols.insert(symbol.to_string());
        self
    }

    /// Delay every listing download by `latency`.
    pub fn with_listing_latency(mut self, latency: Duration) -> Self {
        self.listing_latency = Some(latency);
        self
    }

    /// Symbols requested through `quote_price` or `daily_bars`, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, symbol: &str) {
        self.calls.lock().unwrap().push(symbol.to_string());
    }
}

impl MarketDataSource for MockMarketData {
    async fn fetch_listing(&self, url: &str) -> Result<Vec<String>, MarketError> {
        if let Some(latency) = self.listing_latency {
            tokio::time::sleep(latency).await;
        }
        if self.failing_listings.contains(url) {
            return Err(MarketError::ListingFetchFailed {
                url: url.to_string(),
                reason: "mock listing failure".to_string(),
            });
        }
        Ok(self.listings.get(url).cloned().unwrap_or_default())
    }

    async fn quote_price(&self, symbol: &str) -> Result<Option<Decimal>, MarketError> {
        self.record(symbol);
        if self.failing_symbols.contains(symbol) {
            return Err(MarketError::QuoteFailed {
                symbol: symbol.to_string(),
                reason: "mock quote failure".to_string(),
            });
        }
        match self.prices.get(symbol) {
            Some(price) => Ok(*price),
            None => Err(MarketError::QuoteFailed {
                symbol: symbol.to_string(),
                reason: "unknown symbol".to_string(),
            }),
        }
    }

    async fn daily_bars(&self, symbol: &str) -> Result<Vec<Bar>, MarketError> {
        self.record(symbol);
        if self.failing_symbols.contains(symbol) {
            return Err(MarketError::HistoryFailed {
                symbol: symbol.to_string(),
                reason: "mock history failure".to_string(),
            });
        }
        Ok(self.histories.get(symbol).cloned().unwrap_or_default())
    }
}

/// Build daily bars from parallel close/volume slices; open/high/low mirror the close.
pub fn bars_from(closes: &[Decimal], volumes: &[u64]) -> Vec<Bar> {
    let start = time::macros::date!(2026 - 01 - 05);
    closes
        .iter()
        .zip(volumes)
        .enumerate()
        .map(|(i, (close, volume))| Bar {
            date: start + time::Duration::days(i as i64),
            open: *close,
            high: *close,
            low: *close,
            close: *close,
            volume: *volume,
        })
        .collect()
}
