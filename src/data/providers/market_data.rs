use async_trait::async_trait;

use super::{KlineProvider, ProviderError, ProviderId, RawNumber, get_json, http_client};
use crate::config::ENDPOINTS;
use crate::domain::candle::normalize_candles;
use crate::domain::symbol::get_base;
use crate::domain::{Candle, Interval};
use crate::utils::TimeUtils;

// Ticker -> coin id on the public market-data API.
static COIN_IDS: &[(&str, &str)] = &[
    ("BTC", "bitcoin"),
    ("ETH", "ethereum"),
    ("SOL", "solana"),
    ("XRP", "ripple"),
    ("BNB", "binancecoin"),
    ("ADA", "cardano"),
    ("DOGE", "dogecoin"),
    ("DOT", "polkadot"),
    ("AVAX", "avalanche-2"),
    ("LINK", "chainlink"),
    ("MATIC", "matic-network"),
    ("LTC", "litecoin"),
    ("TRX", "tron"),
];

pub fn coin_id(symbol: &str) -> Option<&'static str> {
    let base = get_base(symbol)?;
    COIN_IDS
        .iter()
        .find(|(ticker, _)| *ticker == base)
        .map(|(_, id)| *id)
}

/// Smallest accepted `days` value covering `limit` candles of `interval`.
/// Falls back to the widest window when nothing covers it.
pub fn days_for(interval: Interval, limit: usize) -> u32 {
    let accepted = ENDPOINTS.market_data.accepted_days;
    let span_ms = interval.as_ms().saturating_mul(limit.max(1) as i64);
    let needed = (span_ms + TimeUtils::MS_IN_D - 1) / TimeUtils::MS_IN_D;
    accepted
        .iter()
        .copied()
        .find(|&d| d as i64 >= needed)
        .or_else(|| accepted.last().copied())
        .unwrap_or(1)
}

/// OHLC from the public market-data API. Volume is not provided and reads as 0.
pub struct MarketDataOhlc {
    base_url: String,
    client: reqwest::Client,
}

impl Default for MarketDataOhlc {
    fn default() -> Self {
        Self::new(ENDPOINTS.market_data.base_url)
    }
}

impl MarketDataOhlc {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: http_client(),
        }
    }
}

fn parse_rows(rows: Vec<Vec<RawNumber>>, limit: usize) -> Result<Vec<Candle>, ProviderError> {
    let candles = rows
        .into_iter()
        .map(|row| {
            if row.len() < 5 {
                return Err(ProviderError::MalformedInput(format!(
                    "ohlc row has {} fields, expected 5",
                    row.len()
                )));
            }
            Ok(Candle::new(
                row[0].to_f64("time")? as i64,
                row[1].to_f64("open")?,
                row[2].to_f64("high")?,
                row[3].to_f64("low")?,
                row[4].to_f64("close")?,
                0.0,
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(normalize_candles(candles, limit))
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl KlineProvider for MarketDataOhlc {
    fn id(&self) -> ProviderId {
        ProviderId::PublicMarketApi
    }

    async fn fetch_klines(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, ProviderError> {
        let id = coin_id(symbol).ok_or_else(|| ProviderError::UnsupportedSymbol(symbol.to_string()))?;

        let url = format!("{}/coins/{}/ohlc", self.base_url, id);
        let request = self.client.get(&url).query(&[
            ("vs_currency", ENDPOINTS.market_data.vs_currency.to_string()),
            ("days", days_for(interval, limit).to_string()),
        ]);
        let rows: Vec<Vec<RawNumber>> = get_json(request).await?;
        parse_rows(rows, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_tickers_only() {
        assert_eq!(coin_id("BTCUSDT"), Some("bitcoin"));
        assert_eq!(coin_id("AVAXUSDC"), Some("avalanche-2"));
        assert_eq!(coin_id("FOOUSDT"), None);
        assert_eq!(coin_id("USDT"), None);
    }

    #[test]
    fn days_snap_up_to_accepted_values() {
        // 500 hours is just under 21 days
        assert_eq!(days_for(Interval::OneHour, 500), 30);
        assert_eq!(days_for(Interval::OneMinute, 500), 1);
        assert_eq!(days_for(Interval::OneDay, 7), 7);
        assert_eq!(days_for(Interval::OneDay, 8), 14);
        assert_eq!(days_for(Interval::OneWeek, 500), 365);
    }

    #[tokio::test]
    async fn unsupported_symbol_fails_without_a_request() {
        // Unroutable base URL: reaching the network would yield TransportFailure
        let provider = MarketDataOhlc::new("http://127.0.0.1:9");
        let err = provider
            .fetch_klines("FOOUSDT", Interval::OneHour, 500)
            .await
            .unwrap_err();
        assert_eq!(err, ProviderError::UnsupportedSymbol("FOOUSDT".to_string()));
    }

    #[test]
    fn rows_become_zero_volume_candles() {
        let rows: Vec<Vec<RawNumber>> =
            serde_json::from_str("[[2000, 2, 3, 1, 2.5], [1000, 1, 2, 0.5, 1.5]]").unwrap();
        let candles = parse_rows(rows, 500).unwrap();
        assert_eq!(candles[0].timestamp_ms, 1000);
        assert!(candles.iter().all(|c| c.volume == 0.0));

        let short: Vec<Vec<RawNumber>> = serde_json::from_str("[[1000, 1, 2]]").unwrap();
        assert!(matches!(parse_rows(short, 500), Err(ProviderError::MalformedInput(_))));
    }
}
