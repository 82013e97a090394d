//! Market data seam between the poller and the network.

use rust_decimal::Decimal;

use super::types::Bar;
use crate::error::MarketError;

/// Read-only market data operations used by the universe builder and scanner.
#[allow(async_fn_in_trait)]
pub trait MarketDataSource {
    /// Download one symbol directory and return its symbols in file order.
    async fn fetch_listing(&self, url: &str) -> Result<Vec<String>, MarketError>;

    /// Latest trade price for a symbol; `Ok(None)` when the provider has none.
    async fn quote_price(&self, symbol: &str) -> Result<Option<Decimal>, MarketError>;

    /// Recent daily bars for a symbol, oldest first.
    async fn daily_bars(&self, symbol: &str) -> Result<Vec<Bar>, MarketError>;
}
