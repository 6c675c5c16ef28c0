use std::collections::VecDeque;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// One OHLCV bucket in canonical form. Every provider maps into this shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket open time, ms since epoch.
    pub timestamp_ms: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(timestamp_ms: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Candle {
            timestamp_ms,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    fn is_finite(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.volume]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Sorts ascending, drops duplicate timestamps (first one wins) and non-finite rows,
/// then keeps only the newest `limit` candles.
pub fn normalize_candles(mut candles: Vec<Candle>, limit: usize) -> Vec<Candle> {
    candles.retain(Candle::is_finite);
    candles.sort_by_key(|c| c.timestamp_ms);
    candles.dedup_by_key(|c| c.timestamp_ms);
    if candles.len() > limit {
        candles.drain(..candles.len() - limit);
    }
    candles
}

pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

pub fn highs(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.high).collect()
}

pub fn lows(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.low).collect()
}

/// Median spacing between consecutive candles, i.e. the bucket size the
/// source actually delivered. `None` with fewer than two candles.
pub fn typical_step_ms(candles: &[Candle]) -> Option<i64> {
    let steps: Vec<i64> = candles
        .iter()
        .tuple_windows()
        .map(|(a, b)| b.timestamp_ms - a.timestamp_ms)
        .sorted_unstable()
        .collect();
    steps.get(steps.len() / 2).copied()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp_ms: i64,
    pub price: f64,
}

/// The working price series: bounded, strictly increasing in time, FIFO eviction.
///
/// Reloads build a fresh window and swap it in whole; live ticks go through
/// [`SeriesWindow::push_tick`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesWindow {
    capacity: usize,
    points: VecDeque<PricePoint>,
}

impl SeriesWindow {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            points: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    /// Builds a window from (already normalized) candles, keeping the newest `capacity` closes.
    pub fn from_candles(candles: &[Candle], capacity: usize) -> Self {
        let mut window = Self::with_capacity(capacity);
        let skip = candles.len().saturating_sub(window.capacity);
        window.points.extend(candles.iter().skip(skip).map(|c| PricePoint {
            timestamp_ms: c.timestamp_ms,
            price: c.close,
        }));
        window
    }

    /// Appends a tick, evicting the oldest point when over capacity.
    /// A timestamp that does not move forward is nudged to one ms past the newest point.
    pub fn push_tick(&mut self, timestamp_ms: i64, price: f64) -> PricePoint {
        let timestamp_ms = match self.points.back() {
            Some(last) if timestamp_ms <= last.timestamp_ms => last.timestamp_ms + 1,
            _ => timestamp_ms,
        };
        let point = PricePoint {
            timestamp_ms,
            price,
        };
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
        point
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn oldest(&self) -> Option<&PricePoint> {
        self.points.front()
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PricePoint> {
        self.points.iter()
    }

    pub fn prices(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(ts: i64, close: f64) -> Candle {
        Candle::new(ts, close, close, close, close, 1.0)
    }

    #[test]
    fn normalize_sorts_dedups_and_trims_to_newest() {
        let raw = vec![
            candle(3, 3.0),
            candle(1, 1.0),
            candle(2, 2.0),
            candle(2, 20.0),
            Candle::new(4, f64::NAN, 1.0, 1.0, 1.0, 1.0),
            candle(5, 5.0),
        ];
        let out = normalize_candles(raw, 3);
        let ts: Vec<i64> = out.iter().map(|c| c.timestamp_ms).collect();
        assert_eq!(ts, vec![2, 3, 5]);
        assert_eq!(out[0].close, 2.0);
    }

    #[test]
    fn step_is_the_median_gap() {
        let candles = vec![candle(0, 1.0), candle(4, 1.0), candle(8, 1.0), candle(20, 1.0)];
        assert_eq!(typical_step_ms(&candles), Some(4));
        assert_eq!(typical_step_ms(&candles[..1]), None);
    }

    #[test]
    fn window_keeps_exact_capacity_and_oldest_advances() {
        let mut window = SeriesWindow::with_capacity(500);
        for i in 0..500 {
            window.push_tick(i, i as f64);
        }
        assert_eq!(window.len(), 500);

        let mut previous_oldest = window.oldest().unwrap().timestamp_ms;
        for i in 500..650 {
            window.push_tick(i, i as f64);
            assert_eq!(window.len(), 500);
            let oldest = window.oldest().unwrap().timestamp_ms;
            assert!(oldest > previous_oldest);
            previous_oldest = oldest;
        }
        assert_eq!(window.latest().unwrap().timestamp_ms, 649);
    }

    #[test]
    fn stale_tick_timestamp_is_nudged_forward() {
        let mut window = SeriesWindow::with_capacity(4);
        window.push_tick(1_000, 1.0);
        let p = window.push_tick(900, 2.0);
        assert_eq!(p.timestamp_ms, 1_001);
        let p = window.push_tick(1_001, 3.0);
        assert_eq!(p.timestamp_ms, 1_002);
    }

    #[test]
    fn from_candles_keeps_newest() {
        let candles: Vec<Candle> = (0..10).map(|i| candle(i, i as f64)).collect();
        let window = SeriesWindow::from_candles(&candles, 4);
        assert_eq!(window.prices(), vec![6.0, 7.0, 8.0, 9.0]);
        assert_eq!(window.capacity(), 4);
    }
}
