use thiserror::Error;

/// Crate-level error type
#[derive(Error, Debug)]
pub enum ScreenerError {
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Market data error: {0}")]
    MarketData(#[from] MarketDataError),
}

/// Configuration rejected at the boundary, before any fetch happens
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error(
        "Activity thresholds out of order: unusual ({unusual}) <= high ({high}) <= extreme ({extreme}) must hold"
    )]
    ThresholdOrder { unusual: f64, high: f64, extreme: f64 },

    #[error("{name} must be a positive finite number, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("Minimum contract volume must be at least 1, got {0}")]
    MinVolume(u64),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: String, value: String },
}

/// Errors raised by the market-data collaborator
#[derive(Error, Debug, Clone)]
pub enum MarketDataError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Deadline in milliseconds
    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl MarketDataError {
    pub fn error_type(&self) -> &'static str {
        match self {
            MarketDataError::ConnectionError(_) => "connection_error",
            MarketDataError::RateLimitError(_) => "rate_limit",
            MarketDataError::ParseError(_) => "parse_error",
            MarketDataError::NotFound(_) => "not_found",
            MarketDataError::Timeout(_) => "timeout",
            MarketDataError::InternalError(_) => "internal_error",
        }
    }
}

#[cfg(feature = "yahoo")]
impl From<reqwest::Error> for MarketDataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            MarketDataError::ConnectionError(
                "Request timeout. Please check your internet connection.".to_string(),
            )
        } else if err.is_connect() {
            MarketDataError::ConnectionError(
                "Failed to connect to the market data API. Please check your internet connection."
                    .to_string(),
            )
        } else if err.is_decode() {
            MarketDataError::ParseError(format!("Response decoding failed: {}", err))
        } else if let Some(status) = err.status() {
            match status.as_u16() {
                429 => MarketDataError::RateLimitError(
                    "Too many requests to the market data API. Retry after 60 seconds."
                        .to_string(),
                ),
                401 | 403 => MarketDataError::ConnectionError(format!(
                    "Market data API refused the request (HTTP {}).",
                    status.as_u16()
                )),
                404 => MarketDataError::NotFound(format!("HTTP {}", status)),
                500..=599 => MarketDataError::ConnectionError(format!(
                    "Market data server error (HTTP {}). Please try again later.",
                    status.as_u16()
                )),
                _ => MarketDataError::InternalError(format!("HTTP error: {}", status)),
            }
        } else {
            MarketDataError::InternalError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for MarketDataError {
    fn from(err: serde_json::Error) -> Self {
        MarketDataError::ParseError(format!("JSON parsing failed: {}", err))
    }
}

/// Per-ticker failure, caught at the watchlist pipeline boundary
#[derive(Error, Debug, Clone)]
pub enum TickerError {
    #[error("{ticker}: failed to load options data ({source})")]
    FetchFailure {
        ticker: String,
        #[source]
        source: MarketDataError,
    },

    #[error("{ticker}: no data ({reason})")]
    NoData { ticker: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ScreenerError>;
