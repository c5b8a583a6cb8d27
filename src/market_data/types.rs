//! Raw option chain rows as delivered by a market-data provider

use serde::{Deserialize, Serialize};

/// One contract row before any derived metric is computed
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawContract {
    pub contract_symbol: Option<String>,
    pub strike: f64,
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
    pub implied_volatility: Option<f64>,
}

impl RawContract {
    /// Convenience constructor for a row with volume and open interest only
    pub fn new(strike: f64, volume: Option<u64>, open_interest: Option<u64>) -> Self {
        Self {
            strike,
            volume,
            open_interest,
            ..Default::default()
        }
    }

    pub fn with_implied_volatility(mut self, iv: f64) -> Self {
        self.implied_volatility = Some(iv);
        self
    }

    pub fn with_contract_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.contract_symbol = Some(symbol.into());
        self
    }
}

/// Calls and puts for one ticker and expiration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptionChain {
    pub calls: Vec<RawContract>,
    pub puts: Vec<RawContract>,
}

impl OptionChain {
    pub fn new(calls: Vec<RawContract>, puts: Vec<RawContract>) -> Self {
        Self { calls, puts }
    }
}
