//! Per-ticker condition detection.

use rust_decimal::Decimal;
use tracing::{debug, instrument};

use super::alert::{Alert, Condition};
use super::indicators::{is_volume_spike, rsi, RsiZone};
use crate::config::Config;
use crate::error::MarketError;
use crate::market::{Bar, MarketDataSource};

/// Scanner thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanParams {
    /// Last volume must exceed this multiple of the window mean.
    pub volume_multiplier: Decimal,
    /// RSI rolling window.
    pub rsi_period: usize,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            volume_multiplier: Decimal::TWO,
            rsi_period: 14,
        }
    }
}

impl From<&Config> for ScanParams {
    fn from(config: &Config) -> Self {
        Self {
            volume_multiplier: config.volume_spike_multiplier,
            rsi_period: config.rsi_period,
        }
    }
}

/// Evaluate the conditions over a bar window. Pure: same input, same output.
///
/// An empty window yields `None` without evaluating anything.
pub fn evaluate(ticker: &str, bars: &[Bar], params: &ScanParams) -> Option<Alert> {
    let last = bars.last()?;
    let mut conditions = Vec::with_capacity(2);

    if is_volume_spike(bars, params.volume_multiplier) {
        conditions.push(Condition::HighVolume);
    }

    let closes: Vec<Decimal> = bars.iter().map(|b| b.close).collect();
    match rsi(&closes, params.rsi_period).map(RsiZone::classify) {
        Some(RsiZone::Oversold) => conditions.push(Condition::Oversold),
        Some(RsiZone::Overbought) => conditions.push(Condition::Overbought),
        Some(RsiZone::Neutral) | None => {}
    }

    Alert::new(ticker, conditions, last.close)
}

/// Fetch the ticker's recent bars and evaluate them.
#[instrument(skip(source, params))]
pub async fn scan_ticker<S: MarketDataSource>(
    source: &S,
    ticker: &str,
    params: &ScanParams,
) -> Result<Option<Alert>, MarketError> {
    let bars = source.daily_bars(ticker).await?;

    if bars.is_empty() {
        debug!("No bars returned");
        return Ok(None);
    }

    let alert = evaluate(ticker, &bars, params);
    if let Some(ref alert) = alert {
        debug!(conditions = ?alert.conditions, "Conditions matched");
    }

    Ok(alert)
}
