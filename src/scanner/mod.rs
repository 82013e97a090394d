//! Scanner module for per-ticker technical conditions.
//!
//! This module handles:
//! - Volume spike and RSI indicators
//! - Alert conditions and message text
//! - Fetch-and-evaluate for one ticker

pub mod alert;
pub mod detector;
pub mod indicators;

pub use alert::{Alert, Condition};
pub use detector::{evaluate, scan_ticker, ScanParams};
pub use indicators::{is_volume_spike, mean_volume, rsi, RsiZone};
