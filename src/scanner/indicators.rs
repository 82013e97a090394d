//! Volume and momentum indicators over daily bars.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::market::Bar;

/// RSI below this is oversold.
pub const RSI_OVERSOLD: f64 = 30.0;

/// RSI above this is overbought.
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// Momentum reading from an RSI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiZone {
    /// Strictly below [`RSI_OVERSOLD`].
    Oversold,
    /// Strictly above [`RSI_OVERBOUGHT`].
    Overbought,
    /// Anywhere in between, thresholds included.
    Neutral,
}

impl RsiZone {
    /// Classify an RSI value. Oversold is tested first.
    pub fn classify(rsi: f64) -> Self {
        if rsi < RSI_OVERSOLD {
            RsiZone::Oversold
        } else if rsi > RSI_OVERBOUGHT {
            RsiZone::Overbought
        } else {
            RsiZone::Neutral
        }
    }
}

/// Mean volume over the window.
pub fn mean_volume(bars: &[Bar]) -> Option<Decimal> {
    if bars.is_empty() {
        return None;
    }
    Some(total_volume(bars) / Decimal::from(bars.len()))
}

/// True when the latest volume exceeds `multiplier` times the window mean.
///
/// Compared as `last * n > multiplier * sum` so no division is involved.
pub fn is_volume_spike(bars: &[Bar], multiplier: Decimal) -> bool {
    let Some(last) = bars.last() else {
        return false;
    };
    let lhs = Decimal::from(last.volume) * Decimal::from(bars.len());
    let rhs = multiplier * total_volume(bars);
    lhs > rhs
}

fn total_volume(bars: &[Bar]) -> Decimal {
    bars.iter().map(|b| Decimal::from(b.volume)).sum()
}

/// Relative Strength Index of the closes over the last `period` differences.
///
/// Averages are simple means of the trailing window (no Wilder smoothing).
/// Returns `None` with fewer than `period` differences, or when the window
/// has neither gains nor losses. All gains and no losses saturates at 100.
pub fn rsi(closes: &[Decimal], period: usize) -> Option<f64> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let window = &closes[closes.len() - (period + 1)..];
    let (mut gain, mut loss) = (0.0_f64, 0.0_f64);
    for pair in window.windows(2) {
        let change = (pair[1] - pair[0]).to_f64()?;
        if change > 0.0 {
            gain += change;
        } else {
            loss -= change;
        }
    }

    let avg_gain = gain / period as f64;
    let avg_loss = loss / period as f64;

    if avg_loss == 0.0 {
        return if avg_gain == 0.0 { None } else { Some(100.0) };
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::bars_from;
    use rust_decimal_macros::dec;

    fn closes(values: &[f64]) -> Vec<Decimal> {
        values
            .iter()
            .map(|v| Decimal::try_from(*v).unwrap())
            .collect()
    }

    #[test]
    fn spike_when_last_volume_exceeds_twice_mean() {
        let bars = bars_from(
            &[dec!(10), dec!(10.5), dec!(11), dec!(9), dec!(8.5)],
            &[100, 100, 100, 100, 500],
        );
        assert_eq!(mean_volume(&bars), Some(dec!(180)));
        assert!(is_volume_spike(&bars, Decimal::TWO));
    }

    #[test]
    fn no_spike_at_exactly_twice_mean() {
        // mean = 200, last = 400
        let bars = bars_from(&[dec!(1); 4], &[100, 100, 200, 400]);
        assert!(!is_volume_spike(&bars, Decimal::TWO));
    }

    #[test]
    fn no_spike_on_empty_window() {
        assert!(!is_volume_spike(&[], Decimal::TWO));
        assert_eq!(mean_volume(&[]), None);
    }

    #[test]
    fn rsi_undefined_with_short_window() {
        let c = closes(&[10.0, 10.5, 11.0, 9.0, 8.5]);
        assert_eq!(rsi(&c, 14), None);
    }

    #[test]
    fn rsi_matches_hand_computation() {
        // diffs: +1, -1, +2, -1 -> avg gain 0.75, avg loss 0.5, rs 1.5, rsi 60
        let c = closes(&[10.0, 11.0, 10.0, 12.0, 11.0]);
        let value = rsi(&c, 4).unwrap();
        assert!((value - 60.0).abs() < 1e-9);
    }

    #[test]
    fn rsi_uses_only_trailing_window() {
        // Leading crash is outside the 2-difference window.
        let c = closes(&[50.0, 10.0, 11.0, 12.0]);
        assert_eq!(rsi(&c, 2), Some(100.0));
    }

    #[test]
    fn rsi_saturates_without_losses_and_is_undefined_when_flat() {
        assert_eq!(rsi(&closes(&[1.0, 2.0, 3.0]), 2), Some(100.0));
        assert_eq!(rsi(&closes(&[2.0, 2.0, 2.0]), 2), None);
        assert_eq!(rsi(&closes(&[3.0, 2.0, 1.0]), 2), Some(0.0));
    }

    #[test]
    fn zone_thresholds_are_strict() {
        assert_eq!(RsiZone::classify(29.99), RsiZone::Oversold);
        assert_eq!(RsiZone::classify(30.0), RsiZone::Neutral);
        assert_eq!(RsiZone::classify(70.0), RsiZone::Neutral);
        assert_eq!(RsiZone::classify(70.01), RsiZone::Overbought);
    }
}
