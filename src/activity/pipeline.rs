//! Watchlist pipeline
//!
//! For each ticker: resolve expiration, fetch spot and chain, annotate calls and
//! puts, filter, aggregate the call/put imbalance. A ticker that fails at any
//! step contributes nothing and is reported as a warning; the batch always
//! completes.

use crate::activity::filter::{filter_unusual, rank_by_vol_over_oi};
use crate::activity::imbalance::aggregate_imbalance;
use crate::activity::metrics::{annotate_chain, ChainContext, MetricsOptions};
use crate::activity::types::{ChainRecord, ImbalanceRow, OptionType};
use crate::config::ScreenerConfig;
use crate::error::{MarketDataError, TickerError};
use crate::market_data::util::with_timeout;
use crate::market_data::{Fetch, MarketDataProvider};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Default watchdog applied to each provider call
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a ticker produced a warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A provider call failed or timed out; ticker skipped
    FetchFailure,
    /// No expirations or no spot; ticker skipped
    NoData,
    /// Selected expiration is not listed; nearest one used instead
    ExpirationFallback,
}

/// Non-fatal, user-facing notice about one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TickerWarning {
    pub ticker: String,
    pub kind: WarningKind,
    pub message: String,
}

impl From<&TickerError> for TickerWarning {
    fn from(err: &TickerError) -> Self {
        match err {
            TickerError::FetchFailure { ticker, .. } => TickerWarning {
                ticker: ticker.clone(),
                kind: WarningKind::FetchFailure,
                message: format!("{}: failed to load options data", ticker),
            },
            TickerError::NoData { ticker, reason } => TickerWarning {
                ticker: ticker.clone(),
                kind: WarningKind::NoData,
                message: format!("{}: {}", ticker, reason),
            },
        }
    }
}

/// Output of one successfully screened ticker
#[derive(Debug, Clone, PartialEq)]
pub struct TickerScreen {
    pub ticker: String,
    pub expiration: String,
    /// Filtered calls followed by filtered puts, in chain order
    pub records: Vec<ChainRecord>,
    pub imbalance: ImbalanceRow,
    pub warnings: Vec<TickerWarning>,
}

/// Merged result of a whole watchlist run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScreenResult {
    pub generated_at: DateTime<Utc>,
    /// Notable contracts, descending Vol/OI, undefined ratios last
    pub records: Vec<ChainRecord>,
    /// One row per successfully screened ticker, in watchlist order
    pub imbalances: Vec<ImbalanceRow>,
    pub warnings: Vec<TickerWarning>,
}

impl ScreenResult {
    /// Merge per-ticker outcomes (in watchlist order) into one ranked result
    pub fn merge(outcomes: Vec<Result<TickerScreen, TickerError>>) -> Self {
        let mut records = Vec::new();
        let mut imbalances = Vec::new();
        let mut warnings = Vec::new();

        for outcome in outcomes {
            match outcome {
                Ok(screen) => {
                    records.extend(screen.records);
                    imbalances.push(screen.imbalance);
                    warnings.extend(screen.warnings);
                }
                Err(err) => warnings.push(TickerWarning::from(&err)),
            }
        }

        rank_by_vol_over_oi(&mut records);

        Self {
            generated_at: Utc::now(),
            records,
            imbalances,
            warnings,
        }
    }

    /// No notable contract in the whole watchlist
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Pretty-printed JSON document of the whole result
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Pick the configured expiration if listed, else the nearest
///
/// Returns the chosen date and, when a selection had to be ignored, a warning.
pub fn resolve_expiration(
    ticker: &str,
    expirations: &[String],
    selected: Option<&str>,
) -> Option<(String, Option<TickerWarning>)> {
    let nearest = expirations.first()?;

    match selected {
        Some(choice) if expirations.iter().any(|e| e == choice) => {
            Some((choice.to_string(), None))
        }
        Some(choice) => {
            let warning = TickerWarning {
                ticker: ticker.to_string(),
                kind: WarningKind::ExpirationFallback,
                message: format!(
                    "{}: expiration {} not listed, using {}",
                    ticker, choice, nearest
                ),
            };
            Some((nearest.clone(), Some(warning)))
        }
        None => Some((nearest.clone(), None)),
    }
}

/// Drives the activity screen across a watchlist
pub struct WatchlistPipeline<P> {
    provider: P,
    fetch_timeout: Duration,
}

impl<P: MarketDataProvider> WatchlistPipeline<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Screen every ticker of the watchlist
    ///
    /// Duplicated tickers are screened again. With `features.parallel` the
    /// tickers run concurrently; the merged output is identical either way.
    pub async fn run(&self, config: &ScreenerConfig) -> ScreenResult {
        tracing::info!(
            tickers = config.watchlist.len(),
            parallel = config.features.parallel,
            "Starting options activity screen"
        );

        let outcomes = if config.features.parallel {
            futures::future::join_all(
                config
                    .watchlist
                    .iter()
                    .map(|ticker| self.screen_ticker(ticker, config)),
            )
            .await
        } else {
            let mut outcomes = Vec::with_capacity(config.watchlist.len());
            for ticker in &config.watchlist {
                outcomes.push(self.screen_ticker(ticker, config).await);
            }
            outcomes
        };

        let result = ScreenResult::merge(outcomes);

        tracing::info!(
            records = result.records.len(),
            imbalances = result.imbalances.len(),
            warnings = result.warnings.len(),
            "Options activity screen complete"
        );

        result
    }

    /// Screen one ticker
    ///
    /// # Errors
    /// * `FetchFailure` - a provider call failed or exceeded the fetch timeout
    /// * `NoData` - no expirations listed, or spot unavailable while the spot
    ///   feature is on
    pub async fn screen_ticker(
        &self,
        ticker: &str,
        config: &ScreenerConfig,
    ) -> Result<TickerScreen, TickerError> {
        let result = self.screen_ticker_inner(ticker, config).await;

        if let Err(err) = &result {
            tracing::warn!(ticker = %ticker, error = %err, "Skipping ticker");
        }

        result
    }

    /// Wait for the provider's permit, then run `call` under the fetch deadline
    ///
    /// The deadline starts once the permit is granted. A throttled provider
    /// can queue a request without the wait turning into a timeout.
    async fn fetch<T, F>(&self, fetch: Fetch<'_>, call: F) -> Result<T, MarketDataError>
    where
        F: Future<Output = Result<T, MarketDataError>>,
    {
        self.provider.acquire(fetch).await?;
        with_timeout(call, fetch.operation(), fetch.ticker(), self.fetch_timeout).await
    }

    async fn screen_ticker_inner(
        &self,
        ticker: &str,
        config: &ScreenerConfig,
    ) -> Result<TickerScreen, TickerError> {
        let fetch_failure = |source: MarketDataError| TickerError::FetchFailure {
            ticker: ticker.to_string(),
            source,
        };
        let no_data = |reason: &str| TickerError::NoData {
            ticker: ticker.to_string(),
            reason: reason.to_string(),
        };

        let expirations = self
            .fetch(Fetch::Expirations(ticker), self.provider.list_expirations(ticker))
            .await
            .map_err(fetch_failure)?;

        let (expiration, fallback) =
            resolve_expiration(ticker, &expirations, config.selected_expiration(ticker))
                .ok_or_else(|| no_data("no option expirations listed"))?;

        let spot = if config.features.spot {
            let spot = self
                .fetch(Fetch::Spot(ticker), self.provider.get_spot_price(ticker))
                .await
                .map_err(fetch_failure)?;

            match spot {
                Some(price) if price.is_finite() && price > 0.0 => Some(price),
                _ => return Err(no_data("spot price unavailable")),
            }
        } else {
            None
        };

        let chain = self
            .fetch(
                Fetch::Chain {
                    ticker,
                    expiration: &expiration,
                },
                self.provider.load_chain(ticker, &expiration),
            )
            .await
            .map_err(fetch_failure)?;

        let options = MetricsOptions {
            relative_volume: config.features.relative_volume,
        };

        let mut records = Vec::new();
        for (option_type, contracts) in [
            (OptionType::Call, &chain.calls),
            (OptionType::Put, &chain.puts),
        ] {
            let ctx = ChainContext {
                ticker,
                expiration: &expiration,
                option_type,
            };
            let annotated = annotate_chain(ctx, contracts, spot, &config.thresholds, options);
            records.extend(filter_unusual(&annotated, config.min_volume));
        }

        let imbalance = aggregate_imbalance(ticker, &expiration, &chain.calls, &chain.puts);

        tracing::debug!(
            ticker = %ticker,
            expiration = %expiration,
            calls = chain.calls.len(),
            puts = chain.puts.len(),
            notable = records.len(),
            bias = %imbalance.bias,
            "Ticker screened"
        );

        Ok(TickerScreen {
            ticker: ticker.to_string(),
            expiration,
            records,
            imbalance,
            warnings: fallback.into_iter().collect(),
        })
    }
}
