// Exchange REST klines through the Binance spot connector. Native only.

use async_trait::async_trait;
use binance_sdk::config::ConfigurationRestApi;
use binance_sdk::spot::{
    SpotRestApi,
    rest_api::{KlinesIntervalEnum, KlinesItemInner, KlinesParams, RestApi},
};
use binance_sdk::{errors, errors::ConnectorError as connection_error};

use super::{KlineProvider, ProviderError, ProviderId};
#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::config::ENDPOINTS;
use crate::domain::candle::normalize_candles;
use crate::domain::{Candle, Interval};

// The klines endpoint serves at most this many rows per call
const MAX_KLINES_PER_CALL: usize = 1000;

impl From<Interval> for KlinesIntervalEnum {
    fn from(interval: Interval) -> Self {
        match interval {
            Interval::OneMinute => KlinesIntervalEnum::Interval1m,
            Interval::ThreeMinutes => KlinesIntervalEnum::Interval3m,
            Interval::FiveMinutes => KlinesIntervalEnum::Interval5m,
            Interval::FifteenMinutes => KlinesIntervalEnum::Interval15m,
            Interval::ThirtyMinutes => KlinesIntervalEnum::Interval30m,
            Interval::OneHour => KlinesIntervalEnum::Interval1h,
            Interval::TwoHours => KlinesIntervalEnum::Interval2h,
            Interval::FourHours => KlinesIntervalEnum::Interval4h,
            Interval::SixHours => KlinesIntervalEnum::Interval6h,
            Interval::EightHours => KlinesIntervalEnum::Interval8h,
            Interval::TwelveHours => KlinesIntervalEnum::Interval12h,
            Interval::OneDay => KlinesIntervalEnum::Interval1d,
            Interval::ThreeDays => KlinesIntervalEnum::Interval3d,
            Interval::OneWeek => KlinesIntervalEnum::Interval1w,
            Interval::OneMonth => KlinesIntervalEnum::Interval1M,
        }
    }
}

#[derive(Debug, Default)]
pub struct ExchangeKlines;

fn configure_client() -> Result<RestApi, ProviderError> {
    let rest_conf = ConfigurationRestApi::builder()
        .timeout(ENDPOINTS.client.timeout_ms)
        .retries(ENDPOINTS.client.retries)
        .backoff(ENDPOINTS.client.backoff_ms)
        .build()
        .map_err(|e| ProviderError::TransportFailure(format!("client setup: {}", e)))?;
    Ok(SpotRestApi::production(rest_conf))
}

fn item_to_f64(item: Option<&KlinesItemInner>, field: &str) -> Result<f64, ProviderError> {
    let value = match item {
        Some(KlinesItemInner::String(s)) => s.parse::<f64>().ok(),
        Some(KlinesItemInner::Integer(i)) => Some(*i as f64),
        _ => None,
    };
    value.ok_or_else(|| ProviderError::MalformedInput(format!("kline {} is not numeric", field)))
}

fn row_to_candle(row: &[KlinesItemInner]) -> Result<Candle, ProviderError> {
    let timestamp_ms = match row.first() {
        Some(KlinesItemInner::Integer(t)) => *t,
        _ => return Err(ProviderError::MalformedInput("kline open_time missing".to_string())),
    };
    Ok(Candle::new(
        timestamp_ms,
        item_to_f64(row.get(1), "open")?,
        item_to_f64(row.get(2), "high")?,
        item_to_f64(row.get(3), "low")?,
        item_to_f64(row.get(4), "close")?,
        item_to_f64(row.get(5), "volume")?,
    ))
}

/// Classifies a connector failure the same way HTTP providers report theirs.
fn classify(e: anyhow::Error, symbol: &str) -> ProviderError {
    let Some(conn_err) = e.downcast_ref::<errors::ConnectorError>() else {
        log::error!("An unexpected error occurred for {}: {:#}", symbol, e);
        return ProviderError::TransportFailure(e.to_string());
    };
    let rejected = |status: u16, msg: &str| ProviderError::UnsuccessfulResponse {
        status: Some(status),
        message: msg.to_string(),
    };
    match conn_err {
        connection_error::TooManyRequestsError(msg) => rejected(429, msg),
        connection_error::RateLimitBanError(msg) => rejected(418, msg),
        connection_error::NotFoundError(msg) => rejected(404, msg),
        connection_error::BadRequestError(msg) => rejected(400, msg),
        connection_error::ServerError { msg, status_code } => ProviderError::UnsuccessfulResponse {
            status: None,
            message: format!("server error {:?}: {}", status_code, msg),
        },
        connection_error::ConnectorClientError(msg) => ProviderError::UnsuccessfulResponse {
            status: None,
            message: msg.to_string(),
        },
        connection_error::NetworkError(msg) => ProviderError::TransportFailure(msg.to_string()),
        other => ProviderError::TransportFailure(other.to_string()),
    }
}

#[async_trait]
impl KlineProvider for ExchangeKlines {
    fn id(&self) -> ProviderId {
        ProviderId::ExchangeRest
    }

    async fn fetch_klines(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, ProviderError> {
        let rest_client = configure_client()?;
        let params = KlinesParams::builder(symbol.to_string(), interval.into())
            .limit(limit.clamp(1, MAX_KLINES_PER_CALL) as i32)
            .build()
            .map_err(|e| ProviderError::MalformedInput(e.to_string()))?;

        let response = rest_client
            .klines(params)
            .await
            .map_err(|e| classify(e, symbol))?;
        let rows: Vec<Vec<KlinesItemInner>> = response
            .data()
            .await
            .map_err(|e| ProviderError::MalformedInput(e.to_string()))?;

        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_resolver_transitions {
            log::info!("[exchange] {} {} -> {} rows", symbol, interval, rows.len());
        }

        let candles = rows
            .iter()
            .map(|row| row_to_candle(row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(normalize_candles(candles, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(t: i64, close: &str) -> Vec<KlinesItemInner> {
        vec![
            KlinesItemInner::Integer(t),
            KlinesItemInner::String("1.0".to_string()),
            KlinesItemInner::String("2.0".to_string()),
            KlinesItemInner::String("0.5".to_string()),
            KlinesItemInner::String(close.to_string()),
            KlinesItemInner::String("12.5".to_string()),
            KlinesItemInner::Integer(t + 59_999),
        ]
    }

    #[test]
    fn converts_sdk_rows() {
        let candle = row_to_candle(&row(60_000, "1.75")).unwrap();
        assert_eq!(candle.timestamp_ms, 60_000);
        assert_eq!(candle.close, 1.75);
        assert_eq!(candle.volume, 12.5);
    }

    #[test]
    fn bad_rows_are_malformed() {
        assert!(matches!(
            row_to_candle(&row(0, "n/a")),
            Err(ProviderError::MalformedInput(_))
        ));
        assert!(matches!(
            row_to_candle(&[KlinesItemInner::String("0".to_string())]),
            Err(ProviderError::MalformedInput(_))
        ));
    }

    #[test]
    fn unknown_errors_are_transport_failures() {
        let err = classify(anyhow::anyhow!("socket closed"), "BTCUSDT");
        assert!(matches!(err, ProviderError::TransportFailure(_)));
    }
}
