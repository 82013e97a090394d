//! Market data module.
//!
//! This module handles:
//! - Bar and chart API types
//! - Symbol directory parsing
//! - The HTTP market data client
//! - Mock data source for testing

pub mod client;
pub mod listing;
pub mod mock;
pub mod source;
pub mod types;

pub use client::MarketDataClient;
pub use listing::parse_symbols;
pub use mock::{bars_from, MockMarketData};
pub use source::MarketDataSource;
pub use types::Bar;
