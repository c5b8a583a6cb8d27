//! Screen Configuration
//!
//! Activity thresholds, volume gate, watchlist and feature flags. Everything is
//! validated here so the calculator and classifier can assume sane input.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Default watchlist used when none is configured
pub const DEFAULT_WATCHLIST: &str = "XLF, SPXL, TQQQ, B, BRK.B";

/// Default minimum contract volume
pub const DEFAULT_MIN_VOLUME: u64 = 100;

/// Vol/OI thresholds for the activity tiers
///
/// Must satisfy `unusual_min <= high_min <= extreme_min`; see [`Self::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityThresholds {
    pub unusual_min: f64,
    pub high_min: f64,
    pub extreme_min: f64,
}

impl Default for ActivityThresholds {
    fn default() -> Self {
        Self::from_unusual(1.0)
    }
}

impl ActivityThresholds {
    pub fn new(unusual_min: f64, high_min: f64, extreme_min: f64) -> Self {
        Self {
            unusual_min,
            high_min,
            extreme_min,
        }
    }

    /// Derive the high and extreme thresholds from the unusual one
    ///
    /// - high = max(1.5 * unusual, unusual + 0.5)
    /// - extreme = max(2 * high, high + 1)
    pub fn from_unusual(unusual_min: f64) -> Self {
        let high_min = (unusual_min * 1.5).max(unusual_min + 0.5);
        let extreme_min = (high_min * 2.0).max(high_min + 1.0);
        Self::new(unusual_min, high_min, extreme_min)
    }

    /// Apply command line overrides on top of already loaded thresholds
    ///
    /// A threshold that is not overridden keeps its value unless a lower tier
    /// was overridden, in which case it is derived again.
    pub fn with_overrides(
        &self,
        unusual: Option<f64>,
        high: Option<f64>,
        extreme: Option<f64>,
    ) -> Self {
        if unusual.is_none() && high.is_none() && extreme.is_none() {
            return *self;
        }

        let lower_changed = unusual.is_some() || high.is_some();
        let high = high.or(unusual.is_none().then_some(self.high_min));
        let extreme = extreme.or((!lower_changed).then_some(self.extreme_min));

        resolve_thresholds(Some(unusual.unwrap_or(self.unusual_min)), high, extreme)
    }

    /// Reject non-positive, non-finite or out-of-order thresholds
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("unusual_min", self.unusual_min),
            ("high_min", self.high_min),
            ("extreme_min", self.extreme_min),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        if self.unusual_min > self.high_min || self.high_min > self.extreme_min {
            return Err(ConfigError::ThresholdOrder {
                unusual: self.unusual_min,
                high: self.high_min,
                extreme: self.extreme_min,
            });
        }

        Ok(())
    }
}

/// Optional pipeline stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineFeatures {
    /// Compute relative volume against the chain median
    pub relative_volume: bool,
    /// Fetch spot and derive %-from-spot and moneyness
    pub spot: bool,
    /// Honor per-ticker expiration choices instead of always using the nearest
    pub expiration_selection: bool,
    /// Process tickers concurrently
    pub parallel: bool,
}

impl Default for PipelineFeatures {
    fn default() -> Self {
        Self {
            relative_volume: true,
            spot: true,
            expiration_selection: true,
            parallel: true,
        }
    }
}

/// Full screen configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerConfig {
    pub thresholds: ActivityThresholds,
    pub min_volume: u64,
    pub watchlist: Vec<String>,
    /// Ticker -> chosen expiration (`YYYY-MM-DD`)
    pub expiration_selection: HashMap<String, String>,
    pub features: PipelineFeatures,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            thresholds: ActivityThresholds::default(),
            min_volume: DEFAULT_MIN_VOLUME,
            watchlist: parse_watchlist(DEFAULT_WATCHLIST),
            expiration_selection: HashMap::new(),
            features: PipelineFeatures::default(),
        }
    }
}

impl ScreenerConfig {
    /// Load configuration from environment variables
    ///
    /// ## Environment Variables
    ///
    /// - `OPTIONS_WATCHLIST`: comma-separated tickers (default: XLF, SPXL, TQQQ, B, BRK.B)
    /// - `OPTIONS_UNUSUAL_MIN`: Vol/OI for Unusual (default: 1.0)
    /// - `OPTIONS_HIGH_MIN`: Vol/OI for High (default: derived from unusual)
    /// - `OPTIONS_EXTREME_MIN`: Vol/OI for Extreme (default: derived from high)
    /// - `OPTIONS_MIN_VOLUME`: minimum contract volume (default: 100)
    /// - `OPTIONS_EXPIRATIONS`: `TICKER=YYYY-MM-DD` pairs, comma-separated
    ///
    /// Only malformed values are rejected here. Callers apply their own
    /// overrides, then call [`Self::validate`] once.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup, unvalidated
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("OPTIONS_WATCHLIST") {
            config.watchlist = parse_watchlist(&raw);
        }

        let unusual: Option<f64> = parse_opt("OPTIONS_UNUSUAL_MIN", lookup("OPTIONS_UNUSUAL_MIN"))?;
        let high: Option<f64> = parse_opt("OPTIONS_HIGH_MIN", lookup("OPTIONS_HIGH_MIN"))?;
        let extreme: Option<f64> = parse_opt("OPTIONS_EXTREME_MIN", lookup("OPTIONS_EXTREME_MIN"))?;
        config.thresholds = resolve_thresholds(unusual, high, extreme);

        if let Some(min_volume) = parse_opt("OPTIONS_MIN_VOLUME", lookup("OPTIONS_MIN_VOLUME"))? {
            config.min_volume = min_volume;
        }

        if let Some(raw) = lookup("OPTIONS_EXPIRATIONS") {
            config.expiration_selection = parse_expiration_selection(&raw)?;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        if self.min_volume < 1 {
            return Err(ConfigError::MinVolume(self.min_volume));
        }
        Ok(())
    }

    /// Expiration chosen for a ticker, if selection is enabled
    pub fn selected_expiration(&self, ticker: &str) -> Option<&str> {
        if !self.features.expiration_selection {
            return None;
        }
        self.expiration_selection.get(ticker).map(String::as_str)
    }
}

/// Fill in missing thresholds the same way the defaults are derived
pub fn resolve_thresholds(
    unusual: Option<f64>,
    high: Option<f64>,
    extreme: Option<f64>,
) -> ActivityThresholds {
    let derived = ActivityThresholds::from_unusual(unusual.unwrap_or(1.0));
    let high_min = high.unwrap_or(derived.high_min);
    let extreme_min = extreme.unwrap_or_else(|| (high_min * 2.0).max(high_min + 1.0));
    ActivityThresholds::new(derived.unusual_min, high_min, extreme_min)
}

/// Split a comma-separated watchlist into upper-cased symbols
///
/// Empty entries are dropped; duplicates are kept in input order.
pub fn parse_watchlist(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
        .collect()
}

/// Parse `TICKER=YYYY-MM-DD` pairs separated by commas
pub fn parse_expiration_selection(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    let mut selection = HashMap::new();
    for pair in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (ticker, date) = parse_expiration_pair(pair)?;
        selection.insert(ticker, date);
    }
    Ok(selection)
}

/// Parse a single `TICKER=YYYY-MM-DD` pair
pub fn parse_expiration_pair(pair: &str) -> Result<(String, String), ConfigError> {
    let invalid = || ConfigError::InvalidValue {
        name: "expiration".to_string(),
        value: pair.to_string(),
    };

    let (ticker, date) = pair.split_once('=').ok_or_else(invalid)?;
    let ticker = ticker.trim().to_uppercase();
    let date = date.trim();

    if ticker.is_empty() || chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
        return Err(invalid());
    }

    Ok((ticker, date.to_string()))
}

fn parse_opt<T: FromStr>(name: &str, raw: Option<String>) -> Result<Option<T>, ConfigError> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                value,
            }),
    }
}
