//! Alert conditions and message formatting.

use rust_decimal::Decimal;
use strum::{Display, EnumString};

/// A condition matched by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum Condition {
    /// Latest volume above the spike multiple of the window mean.
    #[strum(serialize = "High Volume")]
    HighVolume,
    /// RSI strictly below 30.
    #[strum(serialize = "Oversold (RSI<30)")]
    Oversold,
    /// RSI strictly above 70.
    #[strum(serialize = "Overbought (RSI>70)")]
    Overbought,
}

/// One alert for one ticker. Only built when at least one condition matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    /// Ticker symbol.
    pub ticker: String,
    /// Matched conditions in evaluation order.
    pub conditions: Vec<Condition>,
    /// Last close in the window.
    pub last_close: Decimal,
}

impl Alert {
    /// Build an alert, or `None` if nothing matched.
    pub fn new(ticker: &str, conditions: Vec<Condition>, last_close: Decimal) -> Option<Self> {
        if conditions.is_empty() {
            return None;
        }
        Some(Self {
            ticker: ticker.to_string(),
            conditions,
            last_close,
        })
    }

    /// Whether the alert carries `condition`.
    pub fn has(&self, condition: Condition) -> bool {
        self.conditions.contains(&condition)
    }
}

impl std::fmt::Display for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let labels: Vec<String> = self.conditions.iter().map(|c| c.to_string()).collect();
        write!(
            f,
            "🚨 {}: {} | Price ${:.2}",
            self.ticker,
            labels.join(", "),
            self.last_close.round_dp(2)
        )
    }
}
