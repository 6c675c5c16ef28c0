//! Technical indicators over plain price series.
//!
//! Every function is pure and total: short, empty or otherwise unusable input
//! produces `None` entries, never a panic and never a fabricated zero. Outputs
//! are aligned index-for-index with the input so `None` marks the warm-up.

pub mod atr;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use atr::atr;
pub use ema::ema;
pub use macd::{Macd, macd};
pub use rsi::rsi;
pub use sma::sma;

/// An indicator output aligned with its input; `None` where undefined.
pub type IndicatorSeries = Vec<Option<f64>>;

/// Below this many points no indicator is computed at all.
pub const MIN_SERIES_LEN: usize = 2;

/// Scans from the end and returns the most recent defined value.
pub fn last_defined(values: &[Option<f64>]) -> Option<f64> {
    values.iter().rev().find_map(|v| *v)
}

pub(crate) fn all_none(len: usize) -> IndicatorSeries {
    vec![None; len]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_defined_skips_trailing_gaps() {
        assert_eq!(last_defined(&[Some(1.0), Some(2.0), None]), Some(2.0));
        assert_eq!(last_defined(&[None, None]), None);
        assert_eq!(last_defined(&[]), None);
        // Zero is a real reading, not "missing".
        assert_eq!(last_defined(&[Some(5.0), Some(0.0)]), Some(0.0));
    }

    #[test]
    fn single_point_series_is_all_none_everywhere() {
        let one = [42.0];
        assert_eq!(ema(&one, 1), vec![None]);
        assert_eq!(sma(&one, 1), vec![None]);
        assert_eq!(rsi(&one, 1), vec![None]);
        assert_eq!(atr(&one, &one, &one, 1), vec![None]);
        let m = macd(&one, 12, 26, 9);
        assert_eq!(m.histogram, vec![None]);
    }
}
