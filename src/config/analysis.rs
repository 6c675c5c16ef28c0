//! Analysis and computation configuration

use crate::domain::Interval;

/// Indicator periods used for the snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSettings {
    pub ema_period: usize,
    pub sma_period: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub atr_period: usize,
}

/// Thresholds for the narrative rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NarrativeSettings {
    pub rsi_overbought: f64,
    pub rsi_oversold: f64,
    // Fractional distance from EMA for the suggested buy/sell band (0.02 = 2%)
    pub band_pct: f64,
}

/// The Master Analysis Configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    pub default_interval: Interval,
    // Candles requested from each provider
    pub kline_limit: usize,
    // Working series capacity; oldest points are dropped beyond this
    pub series_capacity: usize,
    // Trailing closes used by the forecast regression
    pub forecast_window: usize,

    // Sub-groups
    pub indicators: IndicatorSettings,
    pub narrative: NarrativeSettings,
}

pub const ANALYSIS: AnalysisConfig = AnalysisConfig {
    default_interval: Interval::OneHour,
    kline_limit: 500,
    series_capacity: 500,
    forecast_window: 30,

    indicators: IndicatorSettings {
        ema_period: 20,
        sma_period: 50,
        rsi_period: 14,
        macd_fast: 12,
        macd_slow: 26,
        macd_signal: 9,
        atr_period: 14,
    },

    narrative: NarrativeSettings {
        rsi_overbought: 70.0,
        rsi_oversold: 30.0,
        band_pct: 0.02,
    },
};
