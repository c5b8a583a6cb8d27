// Library exports for options-activity

pub mod activity; // Metrics, classification, filtering and the watchlist pipeline
pub mod config; // Configuration management
pub mod error;
pub mod market_data; // Provider trait, cache layer and fetch watchdog

// HTTP provider against a Yahoo-Finance-compatible API
#[cfg(feature = "yahoo")]
pub mod yahoo;

// Markdown rendering of screen results
pub mod report;
