//! Auxiliary endpoints of the configured backend: spot quotes for the market
//! overview, the AI analysis panel, the server-side forecast and the watched
//! symbol list.
//!
//! Unlike kline providers these are plain request/response helpers returning
//! `anyhow::Result`; the UI shows a placeholder whenever one fails.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::providers::http_client;
use crate::domain::symbol::backend_asset_id;

/// `GET /api/price/{id}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpotQuote {
    pub price: f64,
    #[serde(default)]
    pub change_24h: Option<f64>,
}

/// `GET /api/ai_analysis/{id}`. Text fields are free-form and may be missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AiAnalysis {
    pub sentiment: Option<String>,
    pub technical: Option<String>,
    /// Number or text depending on the backend version
    pub fair_value: Option<Value>,
    pub zones: Option<Value>,
    pub risk: Option<String>,
    pub confidence: Option<f64>,
    /// Sentiment index, 0-100
    pub index: Option<f64>,
    pub historical: Vec<f64>,
}

impl AiAnalysis {
    pub const NEUTRAL_INDEX: f64 = 50.0;

    pub fn index_or_neutral(&self) -> f64 {
        self.index
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(0.0, 100.0))
            .unwrap_or(Self::NEUTRAL_INDEX)
    }
}

/// Renders a loosely typed field for display ("-" when absent).
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) if s.is_empty() => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// `GET /api/predict/{symbol}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteForecast {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(alias = "prediction", alias = "predicted_price", alias = "forecast")]
    pub predicted: f64,
    #[serde(default, alias = "last_price")]
    pub current: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SymbolList {
    Bare(Vec<String>),
    Wrapped { symbols: Vec<String> },
}

#[derive(Debug, Serialize)]
struct AddSymbol<'a> {
    symbol: &'a str,
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {} failed", url))?;
        let status = response.status();
        if !status.is_success() {
            bail!("GET {} returned {}", url, status);
        }
        response
            .json::<T>()
            .await
            .with_context(|| format!("GET {} returned an unexpected body", url))
    }

    pub async fn price(&self, symbol: &str) -> Result<SpotQuote> {
        let quote: SpotQuote = self
            .get(&format!("/api/price/{}", backend_asset_id(symbol)))
            .await?;
        if !quote.price.is_finite() || quote.price <= 0.0 {
            bail!("No usable price for {}", symbol);
        }
        Ok(quote)
    }

    pub async fn ai_analysis(&self, symbol: &str) -> Result<AiAnalysis> {
        self.get(&format!("/api/ai_analysis/{}", backend_asset_id(symbol)))
            .await
    }

    pub async fn predict(&self, symbol: &str) -> Result<RemoteForecast> {
        self.get(&format!("/api/predict/{}", symbol)).await
    }

    pub async fn list_symbols(&self) -> Result<Vec<String>> {
        let list: SymbolList = self.get("/api/symbols").await?;
        Ok(match list {
            SymbolList::Bare(symbols) | SymbolList::Wrapped { symbols } => symbols,
        })
    }

    pub async fn add_symbol(&self, symbol: &str) -> Result<()> {
        let url = self.url("/api/symbols");
        let response = self
            .client
            .post(&url)
            .json(&AddSymbol { symbol })
            .send()
            .await
            .with_context(|| format!("POST {} failed", url))?;
        if !response.status().is_success() {
            bail!("POST {} returned {}", url, response.status());
        }
        Ok(())
    }

    pub async fn remove_symbol(&self, symbol: &str) -> Result<()> {
        let url = self.url(&format!("/api/symbols/{}", symbol));
        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .with_context(|| format!("DELETE {} failed", url))?;
        if !response.status().is_success() {
            bail!("DELETE {} returned {}", url, response.status());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ai_analysis_tolerates_partial_payloads() {
        let ai: AiAnalysis = serde_json::from_str(
            r#"{"sentiment": "Bullish", "fair_value": 43000.5, "zones": "40k-42k", "historical": [1, 2, 3]}"#,
        )
        .unwrap();
        assert_eq!(ai.sentiment.as_deref(), Some("Bullish"));
        assert_eq!(display_value(ai.fair_value.as_ref()), "43000.5");
        assert_eq!(display_value(ai.zones.as_ref()), "40k-42k");
        assert_eq!(display_value(Some(&Value::Null)), "-");
        assert_eq!(ai.risk, None);
        assert_eq!(ai.index_or_neutral(), 50.0);
        assert_eq!(ai.historical.len(), 3);

        let empty: AiAnalysis = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, AiAnalysis::default());
    }

    #[test]
    fn index_is_clamped() {
        let ai = AiAnalysis {
            index: Some(140.0),
            ..Default::default()
        };
        assert_eq!(ai.index_or_neutral(), 100.0);
    }

    #[test]
    fn quote_change_is_optional() {
        let q: SpotQuote = serde_json::from_str(r#"{"price": 1.23}"#).unwrap();
        assert_eq!(q.change_24h, None);
        let q: SpotQuote = serde_json::from_str(r#"{"price": 1.23, "change_24h": -2.5}"#).unwrap();
        assert_eq!(q.change_24h, Some(-2.5));
    }

    #[test]
    fn symbol_lists_and_forecasts_accept_both_shapes() {
        let bare: SymbolList = serde_json::from_str(r#"["BTCUSDT"]"#).unwrap();
        let wrapped: SymbolList = serde_json::from_str(r#"{"symbols": ["ETHUSDT"]}"#).unwrap();
        assert!(matches!(bare, SymbolList::Bare(ref s) if s[0] == "BTCUSDT"));
        assert!(matches!(wrapped, SymbolList::Wrapped { ref symbols } if symbols[0] == "ETHUSDT"));

        let f: RemoteForecast =
            serde_json::from_str(r#"{"symbol": "BTCUSDT", "prediction": 101.5, "last_price": 100}"#).unwrap();
        assert_eq!(f.predicted, 101.5);
        assert_eq!(f.current, Some(100.0));
    }

    #[tokio::test]
    async fn unreachable_backend_is_an_error() {
        let client = BackendClient::new("http://127.0.0.1:9/");
        assert_eq!(client.base_url(), "http://127.0.0.1:9");
        assert!(client.price("BTCUSDT").await.is_err());
    }
}
