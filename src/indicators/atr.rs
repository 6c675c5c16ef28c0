//! Average True Range.
//!
//! TR[t] = max(high - low, |high - close[t-1]|, |low - close[t-1]|), undefined at t = 0.
//! ATR[t] = (sum of the last `period` true ranges) / period, kept as a running sum.

use super::{IndicatorSeries, MIN_SERIES_LEN, all_none};

pub const DEFAULT_ATR_PERIOD: usize = 14;

pub fn true_range(highs: &[f64], lows: &[f64], closes: &[f64]) -> IndicatorSeries {
    let n = highs.len().min(lows.len()).min(closes.len());
    let mut out = all_none(n);
    for i in 1..n {
        let prev_close = closes[i - 1];
        let tr = (highs[i] - lows[i])
            .max((highs[i] - prev_close).abs())
            .max((lows[i] - prev_close).abs());
        out[i] = Some(tr);
    }
    out
}

pub fn atr(highs: &[f64], lows: &[f64], closes: &[f64], period: usize) -> IndicatorSeries {
    let n = highs.len().min(lows.len()).min(closes.len());
    if period == 0 || n < MIN_SERIES_LEN {
        return all_none(n);
    }

    let tr = true_range(highs, lows, closes);
    let mut out = all_none(n);
    let mut window_sum = 0.0;

    // tr[0] is undefined, so the first full window ends at index `period`.
    for i in 1..n {
        window_sum += tr[i].unwrap_or(0.0);
        if i > period {
            window_sum -= tr[i - period].unwrap_or(0.0);
        }
        if i >= period {
            out[i] = Some((window_sum / period as f64).max(0.0));
        }
    }
    out
}
