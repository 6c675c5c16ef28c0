use serde::Serialize;

use crate::config::IndicatorSettings;
use crate::data::providers::{ProviderAttempt, ProviderId};
use crate::domain::candle::{closes, highs, lows};
use crate::domain::{Candle, Interval, PricePoint};
use crate::indicators::{self, IndicatorSeries, last_defined};
use crate::models::forecast::Forecast;

/// Most recent defined reading of each indicator. `None` means still warming up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub rsi: Option<f64>,
    pub ema: Option<f64>,
    pub sma: Option<f64>,
    pub macd_line: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub atr: Option<f64>,
}

/// Full indicator lines, kept alongside the snapshot for charting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorLines {
    pub ema: IndicatorSeries,
    pub rsi: IndicatorSeries,
    pub macd_histogram: IndicatorSeries,
}

impl IndicatorSnapshot {
    pub fn compute(candles: &[Candle], settings: &IndicatorSettings) -> (Self, IndicatorLines) {
        let close = closes(candles);
        let ema = indicators::ema(&close, settings.ema_period);
        let sma = indicators::sma(&close, settings.sma_period);
        let rsi = indicators::rsi(&close, settings.rsi_period);
        let macd = indicators::macd(
            &close,
            settings.macd_fast,
            settings.macd_slow,
            settings.macd_signal,
        );
        let atr = indicators::atr(&highs(candles), &lows(candles), &close, settings.atr_period);

        let snapshot = Self {
            rsi: last_defined(&rsi),
            ema: last_defined(&ema),
            sma: last_defined(&sma),
            macd_line: last_defined(&macd.macd_line),
            macd_signal: last_defined(&macd.signal_line),
            macd_histogram: last_defined(&macd.histogram),
            atr: last_defined(&atr),
        };
        let lines = IndicatorLines {
            ema,
            rsi,
            macd_histogram: macd.histogram,
        };
        (snapshot, lines)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Momentum {
    Bullish,
    Bearish,
    Flat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendBias {
    AboveEma,
    BelowEma,
    AtEma,
}

/// Rule-based reading of the snapshot; each part is `None` when its input is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Narrative {
    pub rsi_zone: Option<RsiZone>,
    pub momentum: Option<Momentum>,
    pub trend: Option<TrendBias>,
    /// (buy near, sell near) around the EMA
    pub band: Option<(f64, f64)>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub symbol: String,
    pub interval: Interval,
    pub source: ProviderId,
    pub latest_price: f64,
    /// Candle spacing the provider delivered; may be coarser than `interval`
    pub source_step_ms: Option<i64>,
    pub snapshot: IndicatorSnapshot,
    pub forecast: Forecast,
    pub narrative: Narrative,
    /// Close series the analysis was computed on, newest last
    pub history: Vec<PricePoint>,
    pub lines: IndicatorLines,
    pub attempts: Vec<ProviderAttempt>,
    pub generated_at_ms: i64,
}

impl Analysis {
    pub fn forecast_price(&self) -> Option<f64> {
        self.forecast.price()
    }

    /// Source candles are coarser than the requested interval.
    pub fn is_coarser_than_requested(&self) -> bool {
        self.source_step_ms
            .is_some_and(|step| step > self.interval.as_ms())
    }
}

/// What the orchestrator hands to the UI. Replaced wholesale on every request.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    Ready(Box<Analysis>),
    /// Every provider failed or returned nothing
    NoData {
        symbol: String,
        interval: Interval,
        attempts: Vec<ProviderAttempt>,
    },
}

impl AnalysisResult {
    pub fn symbol(&self) -> &str {
        match self {
            AnalysisResult::Ready(analysis) => &analysis.symbol,
            AnalysisResult::NoData { symbol, .. } => symbol,
        }
    }

    pub fn attempts(&self) -> &[ProviderAttempt] {
        match self {
            AnalysisResult::Ready(analysis) => &analysis.attempts,
            AnalysisResult::NoData { attempts, .. } => attempts,
        }
    }

    pub fn as_ready(&self) -> Option<&Analysis> {
        match self {
            AnalysisResult::Ready(analysis) => Some(analysis),
            AnalysisResult::NoData { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ANALYSIS;

    #[test]
    fn snapshot_from_too_few_candles_is_empty() {
        let candles = [Candle::new(0, 1.0, 1.0, 1.0, 1.0, 0.0)];
        let (snapshot, lines) = IndicatorSnapshot::compute(&candles, &ANALYSIS.indicators);
        assert_eq!(snapshot, IndicatorSnapshot::default());
        assert_eq!(lines.ema, vec![None]);
    }

    #[test]
    fn snapshot_is_populated_after_warm_up() {
        let candles: Vec<Candle> = (0..120)
            .map(|i| {
                let c = 100.0 + (i as f64 / 7.0).sin() * 4.0;
                Candle::new(i * 60_000, c, c + 1.0, c - 1.0, c, 10.0)
            })
            .collect();
        let (snapshot, lines) = IndicatorSnapshot::compute(&candles, &ANALYSIS.indicators);
        assert!(snapshot.rsi.is_some());
        assert!(snapshot.ema.is_some());
        assert!(snapshot.sma.is_some());
        assert!(snapshot.macd_histogram.is_some());
        assert!(snapshot.atr.unwrap() > 0.0);
        assert_eq!(lines.ema.len(), candles.len());
    }
}
