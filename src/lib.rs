//! Low-priced equity alert bot.
//!
//! Builds a universe of symbols trading under a price ceiling from the
//! exchange symbol directories, scans a batch of them every few minutes for a
//! volume spike or an RSI extreme, and pushes one line per hit to Telegram:
//!
//! ```text
//! 🚨 ABCD: High Volume | Price $8.50
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`market`]: Symbol directories, quotes and daily bars
//! - [`universe`]: Low-priced universe builder
//! - [`scanner`]: Indicators and per-ticker alerts
//! - [`notify`]: Telegram delivery
//! - [`poller`]: The scheduled scan loop
//! - [`metrics`]: Prometheus metrics

pub mod config;
pub mod error;
pub mod market;
pub mod metrics;
pub mod notify;
pub mod poller;
pub mod scanner;
pub mod universe;

pub use config::Config;
pub use error::{BotError, Result};
