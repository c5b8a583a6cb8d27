//! Market Data Collaborator
//!
//! The screen only needs three calls from the outside world: list expirations,
//! load a chain and look up spot. Anything that can answer them implements
//! [`MarketDataProvider`].

pub mod cache;
pub mod types;
pub mod util;

pub use cache::CachedProvider;
pub use types::{OptionChain, RawContract};

use crate::error::MarketDataError;
use async_trait::async_trait;

/// A provider call the pipeline is about to make
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fetch<'a> {
    Expirations(&'a str),
    Chain { ticker: &'a str, expiration: &'a str },
    Spot(&'a str),
}

impl<'a> Fetch<'a> {
    pub fn ticker(&self) -> &'a str {
        match *self {
            Fetch::Expirations(ticker) | Fetch::Spot(ticker) => ticker,
            Fetch::Chain { ticker, .. } => ticker,
        }
    }

    /// Name of the provider method, for logs
    pub fn operation(&self) -> &'static str {
        match *self {
            Fetch::Expirations(_) => "list_expirations",
            Fetch::Chain { .. } => "load_chain",
            Fetch::Spot(_) => "get_spot_price",
        }
    }
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Wait until `fetch` may be issued
    ///
    /// Called before the fetch deadline starts, so time spent queueing for a
    /// request budget is not counted against it. Grants immediately unless
    /// the provider throttles.
    async fn acquire(&self, _fetch: Fetch<'_>) -> Result<(), MarketDataError> {
        Ok(())
    }

    /// Expiration dates (`YYYY-MM-DD`), nearest first; empty if none listed
    async fn list_expirations(&self, ticker: &str) -> Result<Vec<String>, MarketDataError>;

    /// Calls and puts for one expiration
    async fn load_chain(&self, ticker: &str, expiration: &str)
        -> Result<OptionChain, MarketDataError>;

    /// Latest underlying price, `None` without recent trading data
    async fn get_spot_price(&self, ticker: &str) -> Result<Option<f64>, MarketDataError>;
}
