use async_trait::async_trait;
use serde::Deserialize;

use super::{KlineProvider, ProviderError, ProviderId, RawNumber, get_json, http_client};
use crate::domain::candle::normalize_candles;
use crate::domain::{Candle, Interval};

/// Klines from the user-configured backend (`GET {base}/api/klines`).
pub struct BackendKlines {
    base_url: String,
    client: reqwest::Client,
}

impl BackendKlines {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

// Backends in the wild answer either with exchange-style arrays or with
// named objects, and may wrap the list in `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KlinesPayload {
    Rows(Vec<KlineRow>),
    Wrapped { data: Vec<KlineRow> },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum KlineRow {
    Array(Vec<serde_json::Value>),
    Object(KlineObject),
}

#[derive(Debug, Deserialize)]
struct KlineObject {
    #[serde(alias = "timestamp", alias = "time", alias = "t")]
    open_time: RawNumber,
    open: RawNumber,
    high: RawNumber,
    low: RawNumber,
    close: RawNumber,
    #[serde(default)]
    volume: Option<RawNumber>,
}

fn value_to_f64(value: &serde_json::Value, field: &str) -> Result<f64, ProviderError> {
    let raw: RawNumber = serde_json::from_value(value.clone())
        .map_err(|_| ProviderError::MalformedInput(format!("{} is not numeric: {}", field, value)))?;
    raw.to_f64(field)
}

impl TryFrom<KlineRow> for Candle {
    type Error = ProviderError;

    fn try_from(row: KlineRow) -> Result<Self, Self::Error> {
        match row {
            KlineRow::Array(items) => {
                if items.len() < 5 {
                    return Err(ProviderError::MalformedInput(format!(
                        "kline row has {} fields, expected at least 5",
                        items.len()
                    )));
                }
                let volume = match items.get(5) {
                    Some(v) => value_to_f64(v, "volume")?,
                    None => 0.0,
                };
                Ok(Candle::new(
                    value_to_f64(&items[0], "open_time")? as i64,
                    value_to_f64(&items[1], "open")?,
                    value_to_f64(&items[2], "high")?,
                    value_to_f64(&items[3], "low")?,
                    value_to_f64(&items[4], "close")?,
                    volume,
                ))
            }
            KlineRow::Object(obj) => Ok(Candle::new(
                obj.open_time.to_f64("open_time")? as i64,
                obj.open.to_f64("open")?,
                obj.high.to_f64("high")?,
                obj.low.to_f64("low")?,
                obj.close.to_f64("close")?,
                match &obj.volume {
                    Some(v) => v.to_f64("volume")?,
                    None => 0.0,
                },
            )),
        }
    }
}

fn parse_payload(payload: KlinesPayload, limit: usize) -> Result<Vec<Candle>, ProviderError> {
    let rows = match payload {
        KlinesPayload::Rows(rows) | KlinesPayload::Wrapped { data: rows } => rows,
    };
    let candles = rows
        .into_iter()
        .map(Candle::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(normalize_candles(candles, limit))
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl KlineProvider for BackendKlines {
    fn id(&self) -> ProviderId {
        ProviderId::ConfiguredBackend
    }

    async fn fetch_klines(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, ProviderError> {
        let url = format!("{}/api/klines", self.base_url);
        let request = self.client.get(&url).query(&[
            ("symbol", symbol.to_string()),
            ("interval", interval.to_string()),
            ("limit", limit.to_string()),
        ]);
        let payload: KlinesPayload = get_json(request).await?;
        parse_payload(payload, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str, limit: usize) -> Result<Vec<Candle>, ProviderError> {
        let payload: KlinesPayload = serde_json::from_str(json).unwrap();
        parse_payload(payload, limit)
    }

    #[test]
    fn reads_exchange_style_arrays_with_string_numbers() {
        let candles = parse(
            r#"[[2000, "2.0", "3.0", "1.5", "2.5", "10"],
                [1000, 1.0, 2.0, 0.5, 1.5, 5, 1999, "ignored"]]"#,
            500,
        )
        .unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].timestamp_ms, 1000);
        assert_eq!(candles[1].close, 2.5);
        assert_eq!(candles[1].volume, 10.0);
    }

    #[test]
    fn reads_named_objects_and_wrapped_lists() {
        let candles = parse(
            r#"{"data": [
                {"timestamp": 1000, "open": "1", "high": "2", "low": "0.5", "close": "1.5"},
                {"open_time": 2000, "open": 1.5, "high": 2, "low": 1, "close": 1.8, "volume": 3}
            ]}"#,
            500,
        )
        .unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].volume, 0.0);
        assert_eq!(candles[1].close, 1.8);
    }

    #[test]
    fn non_numeric_field_is_malformed() {
        let err = parse(r#"[[1000, "abc", "2", "1", "1.5"]]"#, 500).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedInput(_)));

        let err = parse(r#"[[1000, "1", "2"]]"#, 500).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedInput(_)));
    }

    #[test]
    fn keeps_newest_within_limit() {
        let candles = parse(
            r#"[[3000,1,1,1,3,0],[1000,1,1,1,1,0],[2000,1,1,1,2,0],[2000,1,1,1,2,0]]"#,
            2,
        )
        .unwrap();
        let times: Vec<i64> = candles.iter().map(|c| c.timestamp_ms).collect();
        assert_eq!(times, vec![2000, 3000]);
    }
}
