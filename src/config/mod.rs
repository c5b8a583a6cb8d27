//! Configuration Management
//!
//! This module handles loading screen settings and market-data connection settings.

pub mod http;
pub mod screener;

// Re-export
pub use http::MarketDataConfig;
pub use screener::{ActivityThresholds, PipelineFeatures, ScreenerConfig};
