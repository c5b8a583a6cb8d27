//! Call/put volume imbalance
//!
//! Reads the raw, unfiltered chain; independent of the per-contract pipeline.

use crate::activity::types::{FlowBias, ImbalanceRow};
use crate::market_data::RawContract;

/// Sum volumes of one side, missing volume counted as zero
pub fn total_volume(contracts: &[RawContract]) -> u64 {
    contracts.iter().map(|c| c.volume.unwrap_or(0)).sum()
}

/// call_volume / put_volume, undefined when there is no put volume
pub fn call_put_ratio(call_volume: u64, put_volume: u64) -> Option<f64> {
    (put_volume > 0).then(|| call_volume as f64 / put_volume as f64)
}

/// Aggregate one ticker/expiration into an imbalance row
pub fn aggregate_imbalance(
    ticker: &str,
    expiration: &str,
    calls: &[RawContract],
    puts: &[RawContract],
) -> ImbalanceRow {
    let call_volume = total_volume(calls);
    let put_volume = total_volume(puts);
    let ratio = call_put_ratio(call_volume, put_volume);

    ImbalanceRow {
        ticker: ticker.to_string(),
        expiration: expiration.to_string(),
        call_volume,
        put_volume,
        ratio,
        bias: FlowBias::from_ratio(ratio),
    }
}
