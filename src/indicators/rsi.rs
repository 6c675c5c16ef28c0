//! Relative Strength Index with Wilder smoothing.
//!
//! The first reading sits at index `period` (it needs `period` deltas). A zero
//! average loss is replaced by 1 before dividing.

use super::{IndicatorSeries, MIN_SERIES_LEN, all_none};

pub const DEFAULT_RSI_PERIOD: usize = 14;

pub fn rsi(values: &[f64], period: usize) -> IndicatorSeries {
    let n = values.len();
    if period == 0 || n < MIN_SERIES_LEN || n <= period {
        return all_none(n);
    }

    let mut out = all_none(n);
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=period {
        let delta = values[i] - values[i - 1];
        if delta > 0.0 {
            avg_gain += delta;
        } else {
            avg_loss -= delta;
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    out[period] = Some(rsi_value(avg_gain, avg_loss));

    let p = period as f64;
    for i in (period + 1)..n {
        let delta = values[i] - values[i - 1];
        let (gain, loss) = if delta > 0.0 { (delta, 0.0) } else { (0.0, -delta) };
        avg_gain = (avg_gain * (p - 1.0) + gain) / p;
        avg_loss = (avg_loss * (p - 1.0) + loss) / p;
        out[i] = Some(rsi_value(avg_gain, avg_loss));
    }
    out
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    let denom = if avg_loss == 0.0 { 1.0 } else { avg_loss };
    100.0 - 100.0 / (1.0 + avg_gain / denom)
}
