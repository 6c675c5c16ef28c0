//! Simple Moving Average, trailing window, running sum.

use super::{IndicatorSeries, MIN_SERIES_LEN, all_none};

pub fn sma(values: &[f64], period: usize) -> IndicatorSeries {
    let n = values.len();
    if period == 0 || n < MIN_SERIES_LEN {
        return all_none(n);
    }

    let mut out = all_none(n);
    let mut sum = 0.0;
    for i in 0..n {
        sum += values[i];
        if i >= period {
            sum -= values[i - period];
        }
        if i + 1 >= period {
            out[i] = Some(sum / period as f64);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_mean() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(out, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn shorter_than_period_is_all_none() {
        assert_eq!(sma(&[1.0, 2.0], 3), vec![None, None]);
        assert!(sma(&[], 3).is_empty());
    }
}
