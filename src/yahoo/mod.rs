//! Yahoo Finance market data
//!
//! This module contains the HTTP client implementing [`MarketDataProvider`]
//! against the Yahoo Finance options and chart endpoints.
//!
//! [`MarketDataProvider`]: crate::market_data::MarketDataProvider

pub mod client;
pub mod rate_limiter;
pub mod types;

// Re-export commonly used types
pub use client::YahooClient;
pub use rate_limiter::RateLimiter;
