//! Naive next-tick forecast: ordinary least squares on (index, ln(price)).
//!
//! Fitting in log space keeps the forecast positive and turns a steady
//! percentage trend into a straight line.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::config::ANALYSIS;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastFit {
    /// exp(intercept + slope * window_len)
    pub price: f64,
    /// Per-step drift in log space.
    pub slope: f64,
    pub intercept: f64,
    pub window_len: usize,
    /// Goodness of fit in log space. 1.0 for degenerate single-point windows.
    pub r_squared: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Forecast {
    Available(ForecastFit),
    Unavailable,
}

impl Forecast {
    pub fn price(&self) -> Option<f64> {
        match self {
            Forecast::Available(fit) => Some(fit.price),
            Forecast::Unavailable => None,
        }
    }
}

/// Forecast over the configured trailing window.
pub fn predict_next(closes: &[f64]) -> Forecast {
    predict_next_with_window(closes, ANALYSIS.forecast_window)
}

pub fn predict_next_with_window(closes: &[f64], window: usize) -> Forecast {
    let take = window.min(closes.len());
    if take == 0 {
        return Forecast::Unavailable;
    }
    let recent = &closes[closes.len() - take..];
    if recent.iter().any(|p| !p.is_finite() || *p <= 0.0) {
        return Forecast::Unavailable;
    }

    let ys: Vec<f64> = recent.iter().map(|p| p.ln()).collect();
    let xs: Vec<f64> = (0..take).map(|i| i as f64).collect();
    let x_mean = xs.iter().mean();
    let y_mean = ys.iter().mean();

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(&ys) {
        let dx = x - x_mean;
        let dy = y - y_mean;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    if sxx == 0.0 {
        // Single point: flat line through it.
        return Forecast::Available(ForecastFit {
            price: recent[take - 1],
            slope: 0.0,
            intercept: ys[take - 1],
            window_len: take,
            r_squared: 1.0,
        });
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;
    let r_squared = if syy == 0.0 { 1.0 } else { (sxy * sxy) / (sxx * syy) };
    let price = (intercept + slope * take as f64).exp();

    if !price.is_finite() {
        return Forecast::Unavailable;
    }
    Forecast::Available(ForecastFit {
        price,
        slope,
        intercept,
        window_len: take,
        r_squared,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_unavailable() {
        assert_eq!(predict_next(&[]), Forecast::Unavailable);
        assert_eq!(predict_next(&[]).price(), None);
    }

    #[test]
    fn single_price_returns_itself() {
        assert_eq!(predict_next(&[5.0]).price(), Some(5.0));
    }

    #[test]
    fn geometric_series_extrapolates_exactly() {
        // price_i = 100 * 1.02^i, fit is exact; next step is 100 * 1.02^n
        let closes: Vec<f64> = (0..10).map(|i| 100.0 * 1.02f64.powi(i)).collect();
        let fit = match predict_next(&closes) {
            Forecast::Available(fit) => fit,
            Forecast::Unavailable => panic!("expected a forecast"),
        };
        assert!((fit.price - 100.0 * 1.02f64.powi(10)).abs() < 1e-6);
        assert!((fit.slope - 1.02f64.ln()).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn only_trailing_window_is_used() {
        let window = ANALYSIS.forecast_window;
        let mut closes = vec![1.0; 50];
        closes.extend(std::iter::repeat_n(20.0, window));
        let price = predict_next(&closes).price().unwrap();
        assert!((price - 20.0).abs() < 1e-9);
        assert_eq!(predict_next(&closes), predict_next_with_window(&closes, window));
    }

    #[test]
    fn non_positive_price_is_unavailable() {
        assert_eq!(predict_next(&[1.0, 0.0, 2.0]), Forecast::Unavailable);
    }

    #[test]
    fn forecast_is_positive_on_falling_series() {
        let closes: Vec<f64> = (0..30).map(|i| 100.0 * 0.8f64.powi(i)).collect();
        let price = predict_next(&closes).price().unwrap();
        assert!(price > 0.0 && price < closes[29]);
    }
}
