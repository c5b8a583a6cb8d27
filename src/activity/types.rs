//! Options activity data types
//!
//! Value objects produced by every stage of the screen. Records are built fresh
//! on each run and never mutated after construction.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Contract side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionType {
    Call,
    Put,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "CALL"),
            OptionType::Put => write!(f, "PUT"),
        }
    }
}

/// Discrete Vol/OI activity classification
///
/// Variants are declared in rank order so the derived `Ord` gives
/// `Unknown < Normal < Unusual < High < Extreme`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum ActivityTier {
    Unknown,
    Normal,
    Unusual,
    High,
    Extreme,
}

impl ActivityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityTier::Unknown => "Unknown",
            ActivityTier::Normal => "Normal",
            ActivityTier::Unusual => "Unusual",
            ActivityTier::High => "High",
            ActivityTier::Extreme => "Extreme",
        }
    }
}

impl fmt::Display for ActivityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strike position relative to spot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Moneyness {
    Itm,
    Atm,
    Otm,
}

impl fmt::Display for Moneyness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Moneyness::Itm => write!(f, "ITM"),
            Moneyness::Atm => write!(f, "ATM"),
            Moneyness::Otm => write!(f, "OTM"),
        }
    }
}

/// Directional skew of aggregate call vs put volume
///
/// Thresholds:
/// - CALL_HEAVY: ratio > 1.3
/// - NEUTRAL: 0.7 <= ratio <= 1.3, or ratio undefined
/// - PUT_HEAVY: ratio < 0.7
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum FlowBias {
    #[serde(rename = "CALL_HEAVY")]
    CallHeavy,
    #[serde(rename = "PUT_HEAVY")]
    PutHeavy,
    #[serde(rename = "NEUTRAL")]
    Neutral,
}

impl FlowBias {
    pub const CALL_HEAVY_ABOVE: f64 = 1.3;
    pub const PUT_HEAVY_BELOW: f64 = 0.7;

    /// Determine bias from a call/put volume ratio
    pub fn from_ratio(ratio: Option<f64>) -> Self {
        match ratio {
            Some(r) if r > Self::CALL_HEAVY_ABOVE => Self::CallHeavy,
            Some(r) if r < Self::PUT_HEAVY_BELOW => Self::PutHeavy,
            _ => Self::Neutral,
        }
    }
}

impl fmt::Display for FlowBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowBias::CallHeavy => write!(f, "Call-heavy"),
            FlowBias::PutHeavy => write!(f, "Put-heavy"),
            FlowBias::Neutral => write!(f, "Neutral"),
        }
    }
}

/// One option contract observation with its derived activity metrics
///
/// `open_interest` is `None` when the source reported nothing or reported
/// exactly zero; both mean "unknown". Every derived `Option` field is `None`
/// when its denominator is missing and is never defaulted to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChainRecord {
    /// Underlying symbol (e.g., "SPY")
    pub ticker: String,

    /// CALL or PUT
    pub option_type: OptionType,

    /// Expiration date, `YYYY-MM-DD`
    pub expiration: String,

    /// Exchange contract identifier when the source provides one
    pub contract_symbol: Option<String>,

    pub strike: f64,

    /// Contracts traded this session (missing treated as 0)
    pub volume: u64,

    /// Outstanding contracts; `None` when unknown
    pub open_interest: Option<u64>,

    pub implied_volatility: Option<f64>,

    /// Underlying price attached after fetch
    pub spot: Option<f64>,

    /// volume / open_interest
    pub vol_over_oi: Option<f64>,

    pub activity_tier: ActivityTier,

    /// volume / median volume of the same chain fetch
    pub relative_volume: Option<f64>,

    /// |strike - spot| / spot * 100
    pub pct_from_spot: Option<f64>,

    pub moneyness: Option<Moneyness>,
}

/// Call/put volume aggregate for one ticker and expiration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ImbalanceRow {
    pub ticker: String,
    pub expiration: String,
    pub call_volume: u64,
    pub put_volume: u64,

    /// call_volume / put_volume; `None` when put_volume is zero
    pub ratio: Option<f64>,

    pub bias: FlowBias,
}
