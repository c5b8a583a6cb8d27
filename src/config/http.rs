//! Market Data Connection Configuration
//!
//! Settings for the HTTP market-data client, the fetch watchdog and the
//! response cache.

use crate::error::ConfigError;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

/// Market data client configuration
///
/// ## Environment Variables
///
/// - `YAHOO_BASE_URL`: API base URL (default: https://query2.finance.yahoo.com)
/// - `MARKET_DATA_TIMEOUT_SECS`: per-request timeout (default: 10)
/// - `MARKET_DATA_CACHE_TTL_SECS`: response cache lifetime, 0 disables (default: 60)
/// - `MARKET_DATA_RATE_LIMIT`: requests per minute (default: 120)
#[derive(Debug, Clone, PartialEq)]
pub struct MarketDataConfig {
    /// API base URL, without trailing slash
    pub base_url: String,

    /// Timeout applied to each external call
    pub timeout_secs: u64,

    /// Lifetime of cached expirations, chains and spot prices
    pub cache_ttl_secs: u64,

    /// Client-side request budget
    pub requests_per_minute: u32,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            cache_ttl_secs: 60,
            requests_per_minute: 120,
        }
    }
}

impl MarketDataConfig {
    /// Load market data configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed, or if the
    /// timeout or rate limit is zero
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let base_url = lookup("YAHOO_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.base_url);

        let timeout_secs = parse_or("MARKET_DATA_TIMEOUT_SECS", &lookup, defaults.timeout_secs)?;
        let cache_ttl_secs =
            parse_or("MARKET_DATA_CACHE_TTL_SECS", &lookup, defaults.cache_ttl_secs)?;
        let requests_per_minute =
            parse_or("MARKET_DATA_RATE_LIMIT", &lookup, defaults.requests_per_minute)?;

        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MARKET_DATA_TIMEOUT_SECS".to_string(),
                value: "0".to_string(),
            });
        }
        if requests_per_minute == 0 {
            return Err(ConfigError::InvalidValue {
                name: "MARKET_DATA_RATE_LIMIT".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(Self {
            base_url,
            timeout_secs,
            cache_ttl_secs,
            requests_per_minute,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

fn parse_or<T, F>(name: &str, lookup: &F, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw,
        }),
    }
}
