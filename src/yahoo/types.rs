//! Yahoo Finance API Type Definitions
//!
//! Response shapes for the options (`/v7/finance/options`) and chart
//! (`/v8/finance/chart`) endpoints. Only the fields the screen reads are
//! modelled; everything else is ignored on deserialization.

use crate::market_data::RawContract;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// Error object embedded in both endpoints' envelopes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: Option<String>,
    pub description: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {}",
            self.code.as_deref().unwrap_or("error"),
            self.description.as_deref().unwrap_or("no description")
        )
    }
}

/// Response from /v7/finance/options/{ticker}
///
/// # Example Response
/// ```json
/// {
///   "optionChain": {
///     "result": [{
///       "underlyingSymbol": "SPY",
///       "expirationDates": [1792800000],
///       "quote": { "regularMarketPrice": 580.12 },
///       "options": [{ "expirationDate": 1792800000, "calls": [], "puts": [] }]
///     }],
///     "error": null
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsResponse {
    pub option_chain: OptionsEnvelope,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsEnvelope {
    #[serde(default)]
    pub result: Option<Vec<OptionChainResult>>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionChainResult {
    /// Expirations as Unix seconds, nearest first
    #[serde(default)]
    pub expiration_dates: Vec<i64>,

    #[serde(default)]
    pub options: Vec<OptionsByExpiration>,
}

impl OptionChainResult {
    /// Expirations rendered as `YYYY-MM-DD`, keeping the API order
    pub fn expiration_strings(&self) -> Vec<String> {
        self.expiration_dates
            .iter()
            .filter_map(|secs| epoch_to_date(*secs))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsByExpiration {
    #[serde(default)]
    pub calls: Vec<OptionContract>,
    #[serde(default)]
    pub puts: Vec<OptionContract>,
}

/// One contract row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionContract {
    pub contract_symbol: Option<String>,
    pub strike: f64,
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
    pub implied_volatility: Option<f64>,
}

impl From<&OptionContract> for RawContract {
    fn from(contract: &OptionContract) -> Self {
        RawContract {
            contract_symbol: contract.contract_symbol.clone(),
            strike: contract.strike,
            volume: contract.volume,
            open_interest: contract.open_interest,
            implied_volatility: contract.implied_volatility,
        }
    }
}

/// Response from /v8/finance/chart/{ticker}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartResponse {
    pub chart: ChartEnvelope,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartEnvelope {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartResult {
    pub meta: Option<ChartMeta>,
    pub indicators: Option<Indicators>,
}

impl ChartResult {
    /// Last non-null close of the session, else the quoted market price
    pub fn last_price(&self) -> Option<f64> {
        let last_close = self
            .indicators
            .as_ref()
            .and_then(|i| i.quote.first())
            .and_then(|q| q.close.iter().rev().find_map(|c| *c));

        last_close
            .or_else(|| self.meta.as_ref().and_then(|m| m.regular_market_price))
            .filter(|price| price.is_finite() && *price > 0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub regular_market_price: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteIndicator>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteIndicator {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

/// Unix seconds -> `YYYY-MM-DD` (UTC)
pub fn epoch_to_date(secs: i64) -> Option<String> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// `YYYY-MM-DD` -> Unix seconds at 00:00 UTC
pub fn date_to_epoch(date: &str) -> Option<i64> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}
