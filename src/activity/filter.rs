//! Unusual-activity filter and final ranking

use crate::activity::types::{ActivityTier, ChainRecord};
use std::cmp::Ordering;

/// Keep contracts with `volume >= min_volume` whose tier is not Normal
///
/// Unknown-tier contracts pass: missing open interest alone does not exclude a
/// contract. An empty result is a valid outcome.
pub fn filter_unusual(records: &[ChainRecord], min_volume: u64) -> Vec<ChainRecord> {
    records
        .iter()
        .filter(|r| is_unusual(r, min_volume))
        .cloned()
        .collect()
}

pub fn is_unusual(record: &ChainRecord, min_volume: u64) -> bool {
    record.volume >= min_volume && record.activity_tier != ActivityTier::Normal
}

/// Sort descending by Vol/OI with undefined ratios last
///
/// Stable: equal ratios keep their incoming order.
pub fn rank_by_vol_over_oi(records: &mut [ChainRecord]) {
    records.sort_by(|a, b| compare_vol_over_oi_desc(a.vol_over_oi, b.vol_over_oi));
}

fn compare_vol_over_oi_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
