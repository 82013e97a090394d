//! Application configuration loaded from environment variables.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{BotError, Result};

fn invalid(reason: &str) -> BotError {
    BotError::InvalidConfig(reason.to_string())
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Telegram ===
    /// Bot access token.
    #[serde(default)]
    pub telegram_token: String,

    /// Destination chat identifier.
    #[serde(default)]
    pub chat_id: String,

    /// Telegram Bot API base URL.
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: String,

    // === Market Data ===
    /// Symbol directory URLs, concatenated in this order.
    #[serde(default = "default_listing_urls")]
    pub listing_urls: Vec<String>,

    /// Market data (chart API) base URL.
    #[serde(default = "default_market_data_url")]
    pub market_data_url: String,

    /// User-Agent header for market data requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    // === Universe ===
    /// Symbols are kept only when their price is strictly below this.
    #[serde(default = "default_price_ceiling")]
    pub price_ceiling: Decimal,

    /// Number of listing symbols probed for a price on each rebuild.
    #[serde(default = "default_candidate_limit")]
    pub universe_candidate_limit: usize,

    /// Seconds between universe rebuilds.
    #[serde(default = "default_universe_refresh")]
    pub universe_refresh_secs: u64,

    // === Scanning ===
    /// Tickers scanned per cycle.
    #[serde(default = "default_scan_batch_size")]
    pub scan_batch_size: usize,

    /// Daily bar window requested per scan (e.g. "5d", "1mo").
    #[serde(default = "default_history_range")]
    pub history_range: String,

    /// RSI rolling window.
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// Last volume must exceed this multiple of the window mean.
    #[serde(default = "default_volume_multiplier")]
    pub volume_spike_multiplier: Decimal,

    /// Seconds slept between cycles.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Wall-clock bound on one scan batch in seconds (0 = unbounded).
    #[serde(default = "default_scan_budget")]
    pub scan_budget_secs: u64,

    // === HTTP ===
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    // === Observability ===
    /// Serve Prometheus metrics.
    #[serde(default)]
    pub metrics_enabled: bool,

    /// Prometheus exporter port.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,

    /// Emit JSON log lines.
    #[serde(default)]
    pub log_json: bool,
}

fn default_telegram_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_listing_urls() -> Vec<String> {
    vec![
        "https://www.nasdaqtrader.com/dynamic/SymDir/nasdaqlisted.txt".to_string(),
        "https://www.nasdaqtrader.com/dynamic/SymDir/otherlisted.txt".to_string(),
    ]
}

fn default_market_data_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_price_ceiling() -> Decimal {
    Decimal::new(10, 0) // $10
}

fn default_candidate_limit() -> usize {
    2000
}

fn default_universe_refresh() -> u64 {
    24 * 60 * 60
}

fn default_scan_batch_size() -> usize {
    200
}

fn default_history_range() -> String {
    "5d".to_string()
}

fn default_rsi_period() -> usize {
    14
}

fn default_volume_multiplier() -> Decimal {
    Decimal::TWO
}

fn default_poll_interval() -> u64 {
    300
}

fn default_scan_budget() -> u64 {
    270
}

fn default_http_timeout_ms() -> u64 {
    10_000
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram_token: String::new(),
            chat_id: String::new(),
            telegram_api_url: default_telegram_api_url(),
            listing_urls: default_listing_urls(),
            market_data_url: default_market_data_url(),
            user_agent: default_user_agent(),
            price_ceiling: default_price_ceiling(),
            universe_candidate_limit: default_candidate_limit(),
            universe_refresh_secs: default_universe_refresh(),
            scan_batch_size: default_scan_batch_size(),
            history_range: default_history_range(),
            rsi_period: default_rsi_period(),
            volume_spike_multiplier: default_volume_multiplier(),
            poll_interval_secs: default_poll_interval(),
            scan_budget_secs: default_scan_budget(),
            http_timeout_ms: default_http_timeout_ms(),
            metrics_enabled: false,
            metrics_port: default_metrics_port(),
            rust_log: default_log_level(),
            verbose: false,
            log_json: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// Check the scanning parameters.
    pub fn validate(&self) -> Result<()> {
        if self.listing_urls.is_empty() {
            return Err(invalid("LISTING_URLS must name at least one listing"));
        }

        if self.universe_candidate_limit == 0 {
            return Err(invalid("UNIVERSE_CANDIDATE_LIMIT must be at least 1"));
        }

        if self.scan_batch_size == 0 {
            return Err(invalid("SCAN_BATCH_SIZE must be at least 1"));
        }

        if self.price_ceiling <= Decimal::ZERO {
            return Err(invalid("PRICE_CEILING must be positive"));
        }

        if self.rsi_period == 0 {
            return Err(invalid("RSI_PERIOD must be at least 1"));
        }

        if self.volume_spike_multiplier <= Decimal::ZERO {
            return Err(invalid("VOLUME_SPIKE_MULTIPLIER must be positive"));
        }

        if self.poll_interval_secs == 0 {
            return Err(invalid("POLL_INTERVAL_SECS must be at least 1"));
        }

        Ok(())
    }

    /// Check the scanning parameters and the Telegram destination.
    pub fn validate_for_notify(&self) -> Result<()> {
        self.validate()?;

        if self.telegram_token.is_empty() {
            return Err(invalid("TELEGRAM_TOKEN is required"));
        }

        if self.chat_id.is_empty() {
            return Err(invalid("CHAT_ID is required"));
        }

        Ok(())
    }

    /// Per-request HTTP timeout.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    /// Sleep between cycles.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Interval between universe rebuilds.
    pub fn universe_refresh(&self) -> Duration {
        Duration::from_secs(self.universe_refresh_secs)
    }

    /// Scan batch budget, `None` when unbounded.
    pub fn scan_budget(&self) -> Option<Duration> {
        (self.scan_budget_secs > 0).then(|| Duration::from_secs(self.scan_budget_secs))
    }

    /// Token with all but the last four characters masked.
    pub fn masked_token(&self) -> String {
        let len = self.telegram_token.chars().count();
        if len <= 4 {
            return "*".repeat(len);
        }
        let tail: String = self.telegram_token.chars().skip(len - 4).collect();
        format!("{}{}", "*".repeat(len - 4), tail)
    }
}
