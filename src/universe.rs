//! Universe builder: low-priced symbols from the exchange directories.

use std::time::Instant;

use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::error::MarketError;
use crate::market::MarketDataSource;
use crate::metrics;

/// Universe builder parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniverseParams {
    /// Symbol directory URLs, concatenated in order.
    pub listing_urls: Vec<String>,
    /// Number of leading symbols probed for a price.
    pub candidate_limit: usize,
    /// Symbols are kept when 0 < price < ceiling.
    pub price_ceiling: Decimal,
}

impl From<&Config> for UniverseParams {
    fn from(config: &Config) -> Self {
        Self {
            listing_urls: config.listing_urls.clone(),
            candidate_limit: config.universe_candidate_limit,
            price_ceiling: config.price_ceiling,
        }
    }
}

/// Outcome of one universe build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Universe {
    /// Kept symbols in listing order.
    pub tickers: Vec<String>,
    /// Symbols across all listings before the candidate cap.
    pub listed: usize,
    /// Symbols probed for a price.
    pub probed: usize,
    /// Probes that failed and were skipped.
    pub failed: usize,
}

impl Universe {
    /// Number of kept symbols.
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    /// Whether no symbol was kept.
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

/// Build the universe.
///
/// A failed listing download aborts the build. A failed price probe only
/// excludes that symbol.
#[instrument(skip_all, fields(listings = params.listing_urls.len()))]
pub async fn build_universe<S: MarketDataSource>(
    source: &S,
    params: &UniverseParams,
) -> Result<Universe, MarketError> {
    let _timer = metrics::timer_universe_build();

    let mut symbols = Vec::new();
    for url in &params.listing_urls {
        let listed = source.fetch_listing(url).await?;
        debug!(url = %url, count = listed.len(), "Listing loaded");
        symbols.extend(listed);
    }
    metrics::add_listing_symbols(symbols.len());

    let listed = symbols.len();
    let candidates = symbols.into_iter().take(params.candidate_limit);

    let mut universe = Universe {
        listed,
        ..Universe::default()
    };
    let started = Instant::now();

    for symbol in candidates {
        universe.probed += 1;
        match source.quote_price(&symbol).await {
            // A zero quote marks a dead or halted symbol.
            Ok(Some(price)) if price > Decimal::ZERO && price < params.price_ceiling => {
                universe.tickers.push(symbol)
            }
            Ok(_) => {}
            Err(e) => {
                universe.failed += 1;
                metrics::inc_quote_failures();
                debug!(symbol = %symbol, error = %e, "Quote lookup failed, skipping");
            }
        }
    }

    info!(
        listed = universe.listed,
        probed = universe.probed,
        failed = universe.failed,
        kept = universe.len(),
        elapsed_s = started.elapsed().as_secs(),
        "Universe built"
    );

    Ok(universe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::MockMarketData;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    const NASDAQ: &str = "https://listings.test/nasdaq";
    const OTHER: &str = "https://listings.test/other";

    fn params(limit: usize) -> UniverseParams {
        UniverseParams {
            listing_urls: vec![NASDAQ.to_string(), OTHER.to_string()],
            candidate_limit: limit,
            price_ceiling: dec!(10),
        }
    }

    #[tokio::test]
    async fn keeps_only_symbols_priced_below_ceiling() {
        let source = MockMarketData::new()
            .with_listing(NASDAQ, &["AAA", "BBB", "CCC"])
            .with_listing(OTHER, &["DDD"])
            .with_price("AAA", Some(dec!(4.2)))
            .with_price("BBB", Some(dec!(10)))
            .with_price("CCC", None)
            .with_price("DDD", Some(dec!(9.99)));

        let universe = build_universe(&source, &params(2000)).await.unwrap();

        assert_eq!(universe.tickers, vec!["AAA".to_string(), "DDD".to_string()]);
        assert_eq!(universe.listed, 4);
        assert_eq!(universe.probed, 4);
        assert_eq!(universe.failed, 0);
    }

    #[tokio::test]
    async fn zero_price_is_excluded() {
        let source = MockMarketData::new()
            .with_listing(NASDAQ, &["DEAD", "LIVE"])
            .with_price("DEAD", Some(dec!(0)))
            .with_price("LIVE", Some(dec!(3)));

        let universe = build_universe(&source, &params(2000)).await.unwrap();

        assert_eq!(universe.tickers, vec!["LIVE".to_string()]);
        assert_eq!(universe.probed, 2);
        assert_eq!(universe.failed, 0);
    }

    #[tokio::test]
    async fn failing_quote_is_excluded_without_error() {
        let source = MockMarketData::new()
            .with_listing(NASDAQ, &["AAA", "ZZZZ", "BBB"])
            .with_price("AAA", Some(dec!(1)))
            .with_price("BBB", Some(dec!(2)))
            .with_failing_symbol("ZZZZ");

        let universe = build_universe(&source, &params(2000)).await.unwrap();

        assert_eq!(universe.tickers, vec!["AAA".to_string(), "BBB".to_string()]);
        assert_eq!(universe.failed, 1);
    }

    #[tokio::test]
    async fn candidate_limit_takes_leading_symbols_in_listing_order() {
        let source = MockMarketData::new()
            .with_listing(NASDAQ, &["AAA", "BBB"])
            .with_listing(OTHER, &["CCC"])
            .with_price("AAA", Some(dec!(1)))
            .with_price("BBB", Some(dec!(1)))
            .with_price("CCC", Some(dec!(1)));

        let universe = build_universe(&source, &params(2)).await.unwrap();

        assert_eq!(universe.tickers, vec!["AAA".to_string(), "BBB".to_string()]);
        assert_eq!(source.calls(), vec!["AAA".to_string(), "BBB".to_string()]);
    }

    #[tokio::test]
    async fn listing_failure_aborts_build() {
        let source = MockMarketData::new()
            .with_listing(NASDAQ, &["AAA"])
            .with_failing_listing(OTHER)
            .with_price("AAA", Some(dec!(1)));

        let result = build_universe(&source, &params(2000)).await;

        assert!(matches!(result, Err(MarketError::ListingFetchFailed { .. })));
        assert!(source.calls().is_empty());
    }
}
