//! TTL-based in-memory cache in front of a market-data provider
//!
//! Successful responses are kept for the configured lifetime (60s by default);
//! errors are never cached.

use super::{Fetch, MarketDataProvider, OptionChain};
use crate::error::MarketDataError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Generic keyed store whose entries expire after `ttl`
pub struct TtlCache<T> {
    entries: Mutex<HashMap<String, (T, Instant)>>,
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns a clone of a live entry; expired entries are dropped on read.
    pub fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((value, stored_at)) = entries.get(key) {
            if stored_at.elapsed() < self.ttl {
                return Some(value.clone());
            }
            entries.remove(key);
        }
        None
    }

    /// True if `key` holds a live entry
    pub fn contains(&self, key: &str) -> bool {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .is_some_and(|(_, stored_at)| stored_at.elapsed() < self.ttl)
    }

    pub fn set(&self, key: String, value: T) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key, (value, Instant::now()));
    }

    /// Remove every entry whose key equals `ticker` or starts with `ticker:`
    pub fn invalidate(&self, ticker: &str) {
        let prefix = format!("{}:", ticker);
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|key, _| key != ticker && !key.starts_with(&prefix));
    }
}

fn chain_key(ticker: &str, expiration: &str) -> String {
    format!("{}:{}", ticker, expiration)
}

/// Provider wrapper that serves repeated lookups from memory
pub struct CachedProvider<P> {
    inner: P,
    expirations: TtlCache<Vec<String>>,
    chains: TtlCache<OptionChain>,
    spots: TtlCache<Option<f64>>,
}

impl<P: MarketDataProvider> CachedProvider<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            expirations: TtlCache::new(ttl),
            chains: TtlCache::new(ttl),
            spots: TtlCache::new(ttl),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn is_cached(&self, fetch: Fetch<'_>) -> bool {
        match fetch {
            Fetch::Expirations(ticker) => self.expirations.contains(ticker),
            Fetch::Chain { ticker, expiration } => {
                self.chains.contains(&chain_key(ticker, expiration))
            }
            Fetch::Spot(ticker) => self.spots.contains(ticker),
        }
    }

    /// Drop everything cached for a ticker
    pub fn invalidate(&self, ticker: &str) {
        self.expirations.invalidate(ticker);
        self.chains.invalidate(ticker);
        self.spots.invalidate(ticker);
    }
}

#[async_trait]
impl<P: MarketDataProvider> MarketDataProvider for CachedProvider<P> {
    /// Cache hits never reach the inner provider, so they need no permit
    async fn acquire(&self, fetch: Fetch<'_>) -> Result<(), MarketDataError> {
        if self.is_cached(fetch) {
            return Ok(());
        }
        self.inner.acquire(fetch).await
    }

    async fn list_expirations(&self, ticker: &str) -> Result<Vec<String>, MarketDataError> {
        if let Some(hit) = self.expirations.get(ticker) {
            tracing::debug!(ticker = %ticker, "expirations cache hit");
            return Ok(hit);
        }
        let expirations = self.inner.list_expirations(ticker).await?;
        self.expirations.set(ticker.to_string(), expirations.clone());
        Ok(expirations)
    }

    async fn load_chain(
        &self,
        ticker: &str,
        expiration: &str,
    ) -> Result<OptionChain, MarketDataError> {
        let key = chain_key(ticker, expiration);
        if let Some(hit) = self.chains.get(&key) {
            tracing::debug!(ticker = %ticker, expiration = %expiration, "chain cache hit");
            return Ok(hit);
        }
        let chain = self.inner.load_chain(ticker, expiration).await?;
        self.chains.set(key, chain.clone());
        Ok(chain)
    }

    async fn get_spot_price(&self, ticker: &str) -> Result<Option<f64>, MarketDataError> {
        if let Some(hit) = self.spots.get(ticker) {
            tracing::debug!(ticker = %ticker, "spot cache hit");
            return Ok(hit);
        }
        let spot = self.inner.get_spot_price(ticker).await?;
        self.spots.set(ticker.to_string(), spot);
        Ok(spot)
    }
}
