//! Yahoo Finance HTTP Client
//!
//! HTTP client wrapper for the Yahoo Finance REST API (or any service that
//! mirrors its options and chart endpoints). Provides timeout configuration,
//! user-agent headers and client-side rate limiting.

use crate::config::MarketDataConfig;
use crate::error::MarketDataError;
use crate::market_data::{Fetch, MarketDataProvider, OptionChain, RawContract};
use crate::yahoo::rate_limiter::RateLimiter;
use crate::yahoo::types::{
    date_to_epoch, ChartResponse, ChartResult, OptionChainResult, OptionsResponse,
};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const USER_AGENT: &str = concat!("options-activity/", env!("CARGO_PKG_VERSION"));

/// Yahoo Finance REST API HTTP client
#[derive(Clone)]
pub struct YahooClient {
    /// HTTP client for making requests
    pub(crate) client: Client,
    /// Base URL (default: https://query2.finance.yahoo.com)
    pub(crate) base_url: String,
    pub(crate) rate_limiter: Arc<RateLimiter>,
    /// Permits granted through `acquire` and not yet spent by a request
    reserved: Arc<AtomicUsize>,
}

impl std::fmt::Debug for YahooClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl YahooClient {
    /// Creates a client from market data configuration
    ///
    /// # Errors
    /// Returns `InternalError` if the HTTP client cannot be built
    pub fn new(config: &MarketDataConfig) -> Result<Self, MarketDataError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MarketDataError::InternalError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            rate_limiter: Arc::new(RateLimiter::new(config.requests_per_minute)),
            reserved: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Build `{base_url}/{segments...}` with each segment percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url, MarketDataError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| MarketDataError::InternalError(format!("Invalid base URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| {
                MarketDataError::InternalError(format!("Base URL cannot have a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn wait_for_permit(&self) -> Result<(), MarketDataError> {
        self.rate_limiter
            .wait()
            .await
            .map_err(|e| MarketDataError::RateLimitError(e.to_string()))
    }

    /// Spend a permit granted earlier through `acquire`, if any
    fn take_reserved(&self) -> bool {
        self.reserved
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, MarketDataError> {
        if !self.take_reserved() {
            self.wait_for_permit().await?;
        }

        tracing::debug!(url = %url, "GET");

        let response = self.client.get(url).query(query).send().await?;
        let response = response.error_for_status()?;
        let body = response.json::<T>().await?;
        Ok(body)
    }

    /// Get the options chain document for a ticker
    ///
    /// Calls GET /v7/finance/options/{ticker}[?date=epoch]
    ///
    /// # Arguments
    /// * `ticker` - Underlying symbol (e.g., "SPY")
    /// * `date` - Expiration as Unix seconds; `None` for the nearest
    ///
    /// # Errors
    /// * `NotFound` - API returned no result for the ticker
    /// * `ConnectionError` / `RateLimitError` / `ParseError` - transport failures
    pub async fn get_options(
        &self,
        ticker: &str,
        date: Option<i64>,
    ) -> Result<OptionChainResult, MarketDataError> {
        let url = self.endpoint(&["v7", "finance", "options", ticker])?;
        let query: Vec<(&str, String)> = date
            .map(|d| vec![("date", d.to_string())])
            .unwrap_or_default();

        let response: OptionsResponse = self.get_json(url, &query).await?;
        let envelope = response.option_chain;

        if let Some(err) = envelope.error {
            return Err(MarketDataError::NotFound(format!("{}: {}", ticker, err)));
        }

        envelope
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| MarketDataError::NotFound(format!("{}: no options data", ticker)))
    }

    /// Get the one-day chart for a ticker
    ///
    /// Calls GET /v8/finance/chart/{ticker}?range=1d&interval=1d
    pub async fn get_chart(&self, ticker: &str) -> Result<ChartResult, MarketDataError> {
        let url = self.endpoint(&["v8", "finance", "chart", ticker])?;
        let query = [("range", "1d".to_string()), ("interval", "1d".to_string())];

        let response: ChartResponse = self.get_json(url, &query).await?;
        let envelope = response.chart;

        if let Some(err) = envelope.error {
            return Err(MarketDataError::NotFound(format!("{}: {}", ticker, err)));
        }

        envelope
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| MarketDataError::NotFound(format!("{}: no chart data", ticker)))
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn acquire(&self, fetch: Fetch<'_>) -> Result<(), MarketDataError> {
        self.wait_for_permit().await?;
        self.reserved.fetch_add(1, Ordering::SeqCst);
        tracing::trace!(
            ticker = %fetch.ticker(),
            operation = fetch.operation(),
            "Request permit reserved"
        );
        Ok(())
    }

    async fn list_expirations(&self, ticker: &str) -> Result<Vec<String>, MarketDataError> {
        let result = self.get_options(ticker, None).await?;
        Ok(result.expiration_strings())
    }

    async fn load_chain(
        &self,
        ticker: &str,
        expiration: &str,
    ) -> Result<OptionChain, MarketDataError> {
        let date = date_to_epoch(expiration).ok_or_else(|| {
            MarketDataError::ParseError(format!("Invalid expiration date: {}", expiration))
        })?;

        let result = self.get_options(ticker, Some(date)).await?;

        let Some(by_expiration) = result.options.into_iter().next() else {
            return Ok(OptionChain::default());
        };

        let calls = by_expiration.calls.iter().map(RawContract::from).collect();
        let puts = by_expiration.puts.iter().map(RawContract::from).collect();

        Ok(OptionChain::new(calls, puts))
    }

    async fn get_spot_price(&self, ticker: &str) -> Result<Option<f64>, MarketDataError> {
        let chart = self.get_chart(ticker).await?;
        Ok(chart.last_price())
    }
}
