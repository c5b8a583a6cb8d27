//! Vol/OI activity classification

use crate::activity::types::ActivityTier;
use crate::config::ActivityThresholds;

/// Map a Vol/OI ratio to an activity tier
///
/// Precedence, first match wins:
/// 1. undefined -> Unknown
/// 2. ratio >= extreme_min -> Extreme
/// 3. ratio >= high_min -> High
/// 4. ratio >= unusual_min -> Unusual
/// 5. otherwise Normal
///
/// Threshold ordering is not checked here; see [`ActivityThresholds::validate`].
pub fn classify_activity(vol_over_oi: Option<f64>, thresholds: &ActivityThresholds) -> ActivityTier {
    let Some(ratio) = vol_over_oi else {
        return ActivityTier::Unknown;
    };

    if ratio >= thresholds.extreme_min {
        ActivityTier::Extreme
    } else if ratio >= thresholds.high_min {
        ActivityTier::High
    } else if ratio >= thresholds.unusual_min {
        ActivityTier::Unusual
    } else {
        ActivityTier::Normal
    }
}
