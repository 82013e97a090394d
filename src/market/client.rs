//! HTTP market data client: symbol directories and the chart API.

use std::time::Instant;

use rust_decimal::Decimal;
use tracing::{debug, instrument};
use url::Url;

use super::listing::parse_symbols;
use super::source::MarketDataSource;
use super::types::{Bar, ChartResponse, ChartResult};
use crate::config::Config;
use crate::error::MarketError;
use crate::metrics;

/// Range requested for a price snapshot.
const SNAPSHOT_RANGE: &str = "1d";

/// Bar interval for all chart requests.
const DAILY_INTERVAL: &str = "1d";

/// Market data client backed by HTTPS listings and the chart API.
#[derive(Debug, Clone)]
pub struct MarketDataClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Chart API base URL.
    base_url: String,
    /// Daily bar window for history requests.
    history_range: String,
}

impl MarketDataClient {
    /// Create a client from config. Every request is bounded by the configured timeout.
    pub fn new(config: &Config) -> Result<Self, MarketError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .connect_timeout(config.http_timeout())
            .user_agent(config.user_agent.clone())
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()?;

        Ok(Self {
            http,
            base_url: config.market_data_url.clone(),
            history_range: config.history_range.clone(),
        })
    }

    /// Get the chart API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build `{base}/v8/finance/chart/{symbol}?range=..&interval=1d`.
    pub fn chart_url(&self, symbol: &str, range: &str) -> Result<Url, MarketError> {
        let symbol = provider_symbol(symbol);
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| MarketError::ParseError(format!("not a base url: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol.as_str()]);
        url.query_pairs_mut()
            .append_pair("range", range)
            .append_pair("interval", DAILY_INTERVAL);
        Ok(url)
    }

    /// Fetch one chart series. Failures come back as a reason for the caller to tag.
    async fn fetch_chart(&self, symbol: &str, range: &str) -> Result<ChartResult, String> {
        let url = self.chart_url(symbol, range).map_err(|e| e.to_string())?;
        let start = Instant::now();

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        metrics::record_http_latency(start, "chart");

        let status = response.status();
        let body = response.text().await.map_err(|e| e.to_string())?;

        // Not-found symbols still carry a JSON error body worth reporting.
        let parsed = serde_json::from_str::<ChartResponse>(&body);
        if !status.is_success() {
            return Err(match parsed {
                Ok(chart) => match chart.into_result() {
                    Err(reason) => format!("HTTP {} - {}", status, reason),
                    Ok(_) => format!("HTTP {}", status),
                },
                Err(_) => format!("HTTP {}", status),
            });
        }

        parsed
            .map_err(|e| format!("Failed to parse chart: {}", e))?
            .into_result()
    }
}

impl MarketDataSource for MarketDataClient {
    #[instrument(skip(self))]
    async fn fetch_listing(&self, url: &str) -> Result<Vec<String>, MarketError> {
        let start = Instant::now();
        let failed = |reason: String| MarketError::ListingFetchFailed {
            url: url.to_string(),
            reason,
        };

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        metrics::record_http_latency(start, "listing");

        if !response.status().is_success() {
            return Err(failed(format!("HTTP {}", response.status())));
        }

        let text = response.text().await.map_err(|e| failed(e.to_string()))?;
        let symbols = parse_symbols(&text).map_err(|e| failed(e.to_string()))?;

        debug!(count = symbols.len(), "Parsed listing");

        Ok(symbols)
    }

    #[instrument(skip(self))]
    async fn quote_price(&self, symbol: &str) -> Result<Option<Decimal>, MarketError> {
        let chart = self
            .fetch_chart(symbol, SNAPSHOT_RANGE)
            .await
            .map_err(|reason| MarketError::QuoteFailed {
                symbol: symbol.to_string(),
                reason,
            })?;

        Ok(chart.market_price())
    }

    #[instrument(skip(self))]
    async fn daily_bars(&self, symbol: &str) -> Result<Vec<Bar>, MarketError> {
        let chart = self
            .fetch_chart(symbol, &self.history_range)
            .await
            .map_err(|reason| MarketError::HistoryFailed {
                symbol: symbol.to_string(),
                reason,
            })?;

        let bars = chart.bars()?;
        debug!(count = bars.len(), "Fetched daily bars");

        Ok(bars)
    }
}

/// Directory symbols use `.` for share classes; the chart API uses `-`.
pub fn provider_symbol(symbol: &str) -> String {
    symbol.replace('.', "-")
}
