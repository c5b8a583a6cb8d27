//! Fetch watchdog
//!
//! Every external market-data call made by the pipeline goes through
//! [`with_timeout`], so a single stuck ticker cannot stall the batch.

use crate::error::MarketDataError;
use std::future::Future;
use tokio::time::{timeout, Duration};

/// Run a market-data call with a deadline
///
/// # Arguments
/// - `future`: the provider call
/// - `operation`: name used in logs (e.g., "load_chain")
/// - `ticker`: ticker for context logging
/// - `limit`: deadline for the call
///
/// # Returns
/// - `Ok(T)`: call completed in time
/// - `Err(MarketDataError)`: call failed (passed through) or the deadline
///   passed (`MarketDataError::Timeout`)
pub async fn with_timeout<T, F>(
    future: F,
    operation: &str,
    ticker: &str,
    limit: Duration,
) -> Result<T, MarketDataError>
where
    F: Future<Output = Result<T, MarketDataError>>,
{
    match timeout(limit, future).await {
        Ok(Ok(result)) => {
            tracing::debug!(
                ticker = %ticker,
                operation = %operation,
                "Market data call completed"
            );
            Ok(result)
        }
        Ok(Err(err)) => {
            tracing::debug!(
                ticker = %ticker,
                operation = %operation,
                error = %err,
                error_type = err.error_type(),
                "Market data call failed"
            );
            Err(err)
        }
        Err(_elapsed) => {
            tracing::warn!(
                ticker = %ticker,
                operation = %operation,
                timeout_ms = limit.as_millis() as u64,
                "Market data call exceeded timeout"
            );
            Err(MarketDataError::Timeout(limit.as_millis() as u64))
        }
    }
}
