//! Market data types: daily bars and chart API payloads.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::error::MarketError;

/// One daily OHLCV sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bar {
    /// Trading day (UTC).
    pub date: Date,
    /// Open price.
    pub open: Decimal,
    /// High price.
    pub high: Decimal,
    /// Low price.
    pub low: Decimal,
    /// Close price.
    pub close: Decimal,
    /// Shares traded.
    pub volume: u64,
}

/// Chart API envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    /// Chart body.
    pub chart: ChartBody,
}

/// Chart body: either results or an error.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartBody {
    /// Result series, one per requested symbol.
    pub result: Option<Vec<ChartResult>>,
    /// Provider error.
    pub error: Option<ChartError>,
}

/// Provider-reported error.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartError {
    /// Error code (e.g. "Not Found").
    pub code: Option<String>,
    /// Human-readable description.
    pub description: Option<String>,
}

impl std::fmt::Display for ChartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.code.as_deref().unwrap_or("unknown"),
            self.description.as_deref().unwrap_or("no description")
        )
    }
}

/// One symbol's chart series.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    /// Snapshot metadata.
    pub meta: ChartMeta,
    /// Unix timestamps, one per bar.
    #[serde(default)]
    pub timestamp: Option<Vec<i64>>,
    /// Indicator arrays.
    #[serde(default)]
    pub indicators: Option<ChartIndicators>,
}

/// Snapshot metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartMeta {
    /// Symbol as echoed by the provider.
    pub symbol: Option<String>,
    /// Latest trade price.
    #[serde(rename = "regularMarketPrice")]
    pub regular_market_price: Option<f64>,
    /// Quote currency.
    pub currency: Option<String>,
}

/// Indicator block.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartIndicators {
    /// OHLCV arrays.
    #[serde(default)]
    pub quote: Vec<QuoteArrays>,
}

/// Parallel OHLCV arrays; entries are null on days without data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteArrays {
    /// Opens.
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    /// Highs.
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    /// Lows.
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    /// Closes.
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    /// Volumes.
    #[serde(default)]
    pub volume: Vec<Option<u64>>,
}

impl ChartResponse {
    /// Take the first result series, or the provider error as a reason.
    pub fn into_result(self) -> Result<ChartResult, String> {
        if let Some(err) = self.chart.error {
            return Err(err.to_string());
        }
        self.chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| "empty chart result".to_string())
    }
}

impl ChartResult {
    /// Latest trade price, if the provider reported one.
    pub fn market_price(&self) -> Option<Decimal> {
        self.meta.regular_market_price.and_then(Decimal::from_f64)
    }

    /// Zip the parallel arrays into bars, oldest first.
    ///
    /// Rows with any missing value are skipped.
    pub fn bars(&self) -> Result<Vec<Bar>, MarketError> {
        let timestamps = match &self.timestamp {
            Some(ts) => ts,
            None => return Ok(Vec::new()),
        };
        let quote = match self.indicators.as_ref().and_then(|i| i.quote.first()) {
            Some(q) => q,
            None => return Ok(Vec::new()),
        };

        let at = |values: &[Option<f64>], i: usize| -> Option<Decimal> {
            values.get(i).copied().flatten().and_then(Decimal::from_f64)
        };

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, ts) in timestamps.iter().enumerate() {
            let (Some(open), Some(high), Some(low), Some(close), Some(volume)) = (
                at(&quote.open, i),
                at(&quote.high, i),
                at(&quote.low, i),
                at(&quote.close, i),
                quote.volume.get(i).copied().flatten(),
            ) else {
                continue;
            };

            let date = OffsetDateTime::from_unix_timestamp(*ts)
                .map_err(|e| MarketError::ParseError(format!("bad timestamp {}: {}", ts, e)))?
                .date();

            bars.push(Bar {
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        Ok(bars)
    }
}
