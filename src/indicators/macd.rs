//! MACD line, signal line and histogram.

use super::{IndicatorSeries, ema};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    pub macd_line: IndicatorSeries,
    pub signal_line: IndicatorSeries,
    pub histogram: IndicatorSeries,
}

pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let fast_ema = ema(values, fast);
    let slow_ema = ema(values, slow);

    let macd_line: IndicatorSeries = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();

    // The signal EMA runs over the whole line with the warm-up treated as 0.
    let filled: Vec<f64> = macd_line.iter().map(|v| v.unwrap_or(0.0)).collect();
    let signal_line = ema(&filled, signal);

    let histogram = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();

    Macd {
        macd_line,
        signal_line,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_defined_only_where_both_lines_are() {
        let values: Vec<f64> = (0..80).map(|i| 100.0 + (i as f64 / 5.0).cos() * 3.0 + i as f64 * 0.1).collect();
        let m = macd(&values, 12, 26, 9);
        assert_eq!(m.histogram.len(), values.len());
        for i in 0..values.len() {
            match (m.macd_line[i], m.signal_line[i]) {
                (Some(a), Some(b)) => {
                    assert!((m.histogram[i].unwrap() - (a - b)).abs() < 1e-12)
                }
                _ => assert_eq!(m.histogram[i], None),
            }
        }
        assert!(m.macd_line[24].is_none());
        assert!(m.macd_line[25].is_some());
    }

    #[test]
    fn rising_series_has_positive_macd_line() {
        let values: Vec<f64> = (0..60).map(|i| 10.0 * 1.01f64.powi(i)).collect();
        let m = macd(&values, 12, 26, 9);
        assert!(m.macd_line.last().unwrap().unwrap() > 0.0);
    }

    #[test]
    fn empty_input() {
        let m = macd(&[], 12, 26, 9);
        assert!(m.macd_line.is_empty() && m.signal_line.is_empty() && m.histogram.is_empty());
    }
}
