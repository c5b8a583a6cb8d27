//! Options activity screen
//!
//! Modules:
//! - `types`: ChainRecord, ImbalanceRow and the tier/moneyness/bias enums
//! - `metrics`: Vol/OI, relative volume, distance from spot, moneyness
//! - `classifier`: Vol/OI -> activity tier
//! - `filter`: volume and tier gate, final ranking
//! - `imbalance`: call/put volume bias
//! - `pipeline`: per-ticker orchestration across a watchlist

pub mod classifier;
pub mod filter;
pub mod imbalance;
pub mod metrics;
pub mod pipeline;
pub mod types;

// Re-export main types
pub use classifier::classify_activity;
pub use filter::{filter_unusual, rank_by_vol_over_oi};
pub use imbalance::aggregate_imbalance;
pub use metrics::{annotate_chain, ChainContext, MetricsOptions};
pub use pipeline::{ScreenResult, TickerScreen, TickerWarning, WarningKind, WatchlistPipeline};
pub use types::{ActivityTier, ChainRecord, FlowBias, ImbalanceRow, Moneyness, OptionType};
