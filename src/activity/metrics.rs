//! Per-contract activity metrics
//!
//! Derives Vol/OI, relative volume, distance from spot and moneyness for one
//! fetched chain (calls and puts are separate chains). All functions are pure;
//! the raw rows are only borrowed, so the imbalance aggregator can read the same
//! chain afterwards.

use crate::activity::classifier::classify_activity;
use crate::activity::types::{ChainRecord, Moneyness, OptionType};
use crate::config::ActivityThresholds;
use crate::market_data::RawContract;

/// Identity shared by every contract of one chain fetch
#[derive(Debug, Clone, Copy)]
pub struct ChainContext<'a> {
    pub ticker: &'a str,
    pub expiration: &'a str,
    pub option_type: OptionType,
}

/// Which optional metrics to derive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsOptions {
    pub relative_volume: bool,
}

impl Default for MetricsOptions {
    fn default() -> Self {
        Self {
            relative_volume: true,
        }
    }
}

/// Open interest of exactly zero means "not reported"
pub fn normalize_open_interest(open_interest: Option<u64>) -> Option<u64> {
    open_interest.filter(|oi| *oi > 0)
}

/// volume / open interest, undefined unless open interest is positive
pub fn vol_over_oi(volume: u64, open_interest: Option<u64>) -> Option<f64> {
    normalize_open_interest(open_interest).map(|oi| volume as f64 / oi as f64)
}

/// Median volume of a chain, `None` for an empty chain
pub fn median_volume(volumes: &[u64]) -> Option<f64> {
    if volumes.is_empty() {
        return None;
    }

    let mut sorted = volumes.to_vec();
    sorted.sort_unstable();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0)
    } else {
        Some(sorted[mid] as f64)
    }
}

/// volume / chain median, undefined when the median is missing or zero
pub fn relative_volume(volume: u64, median: Option<f64>) -> Option<f64> {
    median
        .filter(|m| *m > 0.0)
        .map(|m| volume as f64 / m)
}

/// |strike - spot| / spot * 100, undefined without a positive spot
pub fn pct_from_spot(strike: f64, spot: Option<f64>) -> Option<f64> {
    positive_spot(spot).map(|s| (strike - s).abs() / s * 100.0)
}

/// ITM / ATM / OTM relative to spot
pub fn moneyness(option_type: OptionType, strike: f64, spot: Option<f64>) -> Option<Moneyness> {
    let spot = positive_spot(spot)?;

    let below_spot = match option_type {
        OptionType::Call => Moneyness::Itm,
        OptionType::Put => Moneyness::Otm,
    };
    let above_spot = match option_type {
        OptionType::Call => Moneyness::Otm,
        OptionType::Put => Moneyness::Itm,
    };

    if strike < spot {
        Some(below_spot)
    } else if strike > spot {
        Some(above_spot)
    } else {
        Some(Moneyness::Atm)
    }
}

fn positive_spot(spot: Option<f64>) -> Option<f64> {
    spot.filter(|s| s.is_finite() && *s > 0.0)
}

/// Build fully annotated records for one chain fetch
///
/// The relative-volume median is taken over every row of `contracts`, before
/// any filtering, with missing volumes counted as zero.
pub fn annotate_chain(
    ctx: ChainContext<'_>,
    contracts: &[RawContract],
    spot: Option<f64>,
    thresholds: &ActivityThresholds,
    options: MetricsOptions,
) -> Vec<ChainRecord> {
    let volumes: Vec<u64> = contracts.iter().map(|c| c.volume.unwrap_or(0)).collect();

    let median = if options.relative_volume {
        median_volume(&volumes)
    } else {
        None
    };

    contracts
        .iter()
        .zip(volumes)
        .map(|(contract, volume)| {
            let open_interest = normalize_open_interest(contract.open_interest);
            let ratio = vol_over_oi(volume, open_interest);

            ChainRecord {
                ticker: ctx.ticker.to_string(),
                option_type: ctx.option_type,
                expiration: ctx.expiration.to_string(),
                contract_symbol: contract.contract_symbol.clone(),
                strike: contract.strike,
                volume,
                open_interest,
                implied_volatility: contract.implied_volatility,
                spot,
                vol_over_oi: ratio,
                activity_tier: classify_activity(ratio, thresholds),
                relative_volume: relative_volume(volume, median),
                pct_from_spot: pct_from_spot(contract.strike, spot),
                moneyness: moneyness(ctx.option_type, contract.strike, spot),
            }
        })
        .collect()
}
