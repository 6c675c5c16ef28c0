//! Kline providers tried, in order, by the resolver.
//!
//! Each provider maps its own wire format into canonical [`Candle`]s and
//! reports failures through [`ProviderError`]. Nothing here retries or falls
//! back; that is the resolver's job.

pub mod backend;
#[cfg(not(target_arch = "wasm32"))]
pub mod exchange;
pub mod market_data;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[cfg(not(target_arch = "wasm32"))]
use crate::config::ENDPOINTS;
use crate::domain::{Candle, Interval};

pub use backend::BackendKlines;
#[cfg(not(target_arch = "wasm32"))]
pub use exchange::ExchangeKlines;
pub use market_data::MarketDataOhlc;

/// Which source a provider stands for. Declaration order is fallback priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProviderId {
    ConfiguredBackend,
    PublicMarketApi,
    ExchangeRest,
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderId::ConfiguredBackend => write!(f, "backend"),
            ProviderId::PublicMarketApi => write!(f, "market-data API"),
            ProviderId::ExchangeRest => write!(f, "exchange REST"),
        }
    }
}

/// Why a single provider attempt did not produce candles.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Network, DNS, TLS or CORS failure before a response arrived
    TransportFailure(String),
    /// A response arrived with a non-success status
    UnsuccessfulResponse { status: Option<u16>, message: String },
    /// Success, but no usable records
    EmptyResult,
    /// The provider has no mapping for this symbol; no request was made
    UnsupportedSymbol(String),
    /// Payload could not be read as candles (non-numeric fields, wrong shape)
    MalformedInput(String),
    /// The attempt did not finish within the resolver's deadline
    DeadlineExceeded(Duration),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::TransportFailure(msg) => write!(f, "transport failure: {}", msg),
            ProviderError::UnsuccessfulResponse {
                status: Some(code),
                message,
            } => write!(f, "unsuccessful response ({}): {}", code, message),
            ProviderError::UnsuccessfulResponse {
                status: None,
                message,
            } => write!(f, "unsuccessful response: {}", message),
            ProviderError::EmptyResult => write!(f, "empty result"),
            ProviderError::UnsupportedSymbol(symbol) => write!(f, "unsupported symbol: {}", symbol),
            ProviderError::MalformedInput(msg) => write!(f, "malformed input: {}", msg),
            ProviderError::DeadlineExceeded(d) => {
                write!(f, "no answer within {} ms", d.as_millis())
            }
        }
    }
}

impl std::error::Error for ProviderError {}

#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome {
    Candles(usize),
    Failed(ProviderError),
}

/// One line of the resolution log, kept for status reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderAttempt {
    pub provider: ProviderId,
    pub outcome: AttemptOutcome,
}

impl fmt::Display for ProviderAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            AttemptOutcome::Candles(n) => write!(f, "{}: {} candles", self.provider, n),
            AttemptOutcome::Failed(e) => write!(f, "{}: {}", self.provider, e),
        }
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait KlineProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Up to `limit` most recent candles, ascending. May be empty.
    async fn fetch_klines(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, ProviderError>;
}

/// A JSON number that some APIs send as a string ("42000.10").
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(f64),
    Text(String),
}

impl RawNumber {
    pub fn to_f64(&self, field: &str) -> Result<f64, ProviderError> {
        let value = match self {
            RawNumber::Number(n) => Some(*n),
            RawNumber::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value
            .filter(|v| v.is_finite())
            .ok_or_else(|| ProviderError::MalformedInput(format!("{} is not numeric: {:?}", field, self)))
    }
}

/// Shared reqwest client. Native builds get a request timeout; the browser
/// fetch API has none to configure.
pub fn http_client() -> reqwest::Client {
    #[cfg(not(target_arch = "wasm32"))]
    {
        reqwest::Client::builder()
            .timeout(Duration::from_millis(ENDPOINTS.client.timeout_ms))
            .build()
            .unwrap_or_else(|e| {
                log::warn!("⚠️  Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            })
    }
    #[cfg(target_arch = "wasm32")]
    {
        reqwest::Client::new()
    }
}

/// Sends a GET and decodes JSON, classifying every failure mode.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::TransportFailure(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::UnsuccessfulResponse {
            status: Some(status.as_u16()),
            message: status.canonical_reason().unwrap_or("unknown").to_string(),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::MalformedInput(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_numbers_accept_strings_and_numbers() {
        let parsed: Vec<RawNumber> = serde_json::from_str(r#"[1.5, "2.25", " 3 ", "abc"]"#).unwrap();
        assert_eq!(parsed[0].to_f64("a").unwrap(), 1.5);
        assert_eq!(parsed[1].to_f64("b").unwrap(), 2.25);
        assert_eq!(parsed[2].to_f64("c").unwrap(), 3.0);
        assert!(matches!(
            parsed[3].to_f64("d"),
            Err(ProviderError::MalformedInput(_))
        ));
    }

    #[test]
    fn priority_follows_declaration_order() {
        assert!(ProviderId::ConfiguredBackend < ProviderId::PublicMarketApi);
        assert!(ProviderId::PublicMarketApi < ProviderId::ExchangeRest);
    }

    #[test]
    fn attempt_display_is_readable() {
        let attempt = ProviderAttempt {
            provider: ProviderId::PublicMarketApi,
            outcome: AttemptOutcome::Failed(ProviderError::UnsupportedSymbol("FOOUSDT".into())),
        };
        assert_eq!(attempt.to_string(), "market-data API: unsupported symbol: FOOUSDT");
    }
}
