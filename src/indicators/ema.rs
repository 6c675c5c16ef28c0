//! Exponential Moving Average.
//!
//! EMA[0] = values[0]; EMA[t] = k * values[t] + (1 - k) * EMA[t-1], k = 2 / (period + 1).
//! The recurrence runs from the first raw value; entries before `period - 1`
//! are reported as `None`.

use super::{IndicatorSeries, MIN_SERIES_LEN, all_none};

pub fn ema(values: &[f64], period: usize) -> IndicatorSeries {
    let n = values.len();
    if period == 0 || n < MIN_SERIES_LEN {
        return all_none(n);
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(n);
    let mut prev = values[0];

    for (i, &v) in values.iter().enumerate() {
        if i > 0 {
            prev = v * k + prev * (1.0 - k);
        }
        out.push(if i + 1 >= period { Some(prev) } else { None });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn seeds_from_first_value_not_sma() {
        let out = ema(&[10.0, 11.0, 12.0, 13.0], 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        // k = 0.5: 10 -> 10.5 -> 11.25 -> 12.125
        assert!(approx(out[2].unwrap(), 11.25));
        assert!(approx(out[3].unwrap(), 12.125));
    }

    #[test]
    fn shorter_than_period_is_all_none() {
        let out = ema(&[1.0, 2.0, 3.0], 5);
        assert_eq!(out, vec![None, None, None]);
    }

    #[test]
    fn constant_series_stays_constant() {
        let out = ema(&[7.0; 20], 5);
        assert!(out.iter().skip(4).all(|v| approx(v.unwrap(), 7.0)));
    }
}
