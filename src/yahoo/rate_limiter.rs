//! Client-side rate limiter for market-data requests
//!
//! Implements GCRA (Generic Cell Rate Algorithm) via governor crate.
//! Requests over budget wait in line for up to 30s, then fail.

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Maximum time to wait in queue before rejecting request
const QUEUE_TIMEOUT_SECS: u64 = 30;

/// Rate limiter errors
#[derive(Debug, Error)]
pub enum RateLimiterError {
    #[error("Rate limit queue timeout after {0}s")]
    QueueTimeout(u64),
}

/// Client-side rate limiter for REST API requests
pub struct RateLimiter {
    limiter: GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    queue_timeout: Duration,
}

impl RateLimiter {
    /// Create a limiter allowing `requests_per_minute` (zero is treated as one)
    pub fn new(requests_per_minute: u32) -> Self {
        Self::with_queue_timeout(requests_per_minute, Duration::from_secs(QUEUE_TIMEOUT_SECS))
    }

    pub fn with_queue_timeout(requests_per_minute: u32, queue_timeout: Duration) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN));

        Self {
            limiter: GovernorRateLimiter::direct(quota),
            queue_timeout,
        }
    }

    /// Wait for rate limit permission (async, with timeout)
    pub async fn wait(&self) -> Result<(), RateLimiterError> {
        if self.limiter.check().is_ok() {
            return Ok(());
        }

        warn!("Market data request budget exhausted, queueing request");

        let waited = timeout(self.queue_timeout, async {
            loop {
                if self.limiter.check().is_ok() {
                    debug!("Rate limit permission granted");
                    return;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        })
        .await;

        waited.map_err(|_| {
            warn!(
                timeout_secs = self.queue_timeout.as_secs(),
                "Rate limit queue timeout exceeded"
            );
            RateLimiterError::QueueTimeout(self.queue_timeout.as_secs())
        })
    }
}
