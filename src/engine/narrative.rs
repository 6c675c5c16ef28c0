use crate::config::NarrativeSettings;
use crate::models::{IndicatorSnapshot, Momentum, Narrative, RsiZone, TrendBias};

/// Turns the latest indicator readings into the rule-based commentary.
/// Each clause is skipped while its indicator is still warming up.
pub fn build_narrative(
    latest_price: f64,
    snapshot: &IndicatorSnapshot,
    settings: &NarrativeSettings,
) -> Narrative {
    let rsi_zone = snapshot.rsi.map(|rsi| {
        if rsi > settings.rsi_overbought {
            RsiZone::Overbought
        } else if rsi < settings.rsi_oversold {
            RsiZone::Oversold
        } else {
            RsiZone::Neutral
        }
    });

    let momentum = snapshot.macd_histogram.map(|h| {
        if h > 0.0 {
            Momentum::Bullish
        } else if h < 0.0 {
            Momentum::Bearish
        } else {
            Momentum::Flat
        }
    });

    let trend = snapshot.ema.map(|ema| {
        if latest_price > ema {
            TrendBias::AboveEma
        } else if latest_price < ema {
            TrendBias::BelowEma
        } else {
            TrendBias::AtEma
        }
    });

    let band = snapshot
        .ema
        .map(|ema| (ema * (1.0 - settings.band_pct), ema * (1.0 + settings.band_pct)));

    let mut clauses: Vec<String> = Vec::new();
    match (rsi_zone, snapshot.rsi) {
        (Some(RsiZone::Overbought), Some(rsi)) => clauses.push(format!("RSI {:.1}: overbought", rsi)),
        (Some(RsiZone::Oversold), Some(rsi)) => clauses.push(format!("RSI {:.1}: oversold", rsi)),
        (Some(RsiZone::Neutral), Some(rsi)) => clauses.push(format!("RSI {:.1}: neutral", rsi)),
        _ => {}
    }
    if let Some(m) = momentum {
        clauses.push(
            match m {
                Momentum::Bullish => "MACD histogram positive: bullish momentum",
                Momentum::Bearish => "MACD histogram negative: bearish momentum",
                Momentum::Flat => "MACD histogram zero: flat momentum",
            }
            .to_string(),
        );
    }
    if let Some(t) = trend {
        clauses.push(
            match t {
                TrendBias::AboveEma => "Price above EMA",
                TrendBias::BelowEma => "Price below EMA",
                TrendBias::AtEma => "Price at EMA",
            }
            .to_string(),
        );
    }
    if let Some((buy, sell)) = band {
        clauses.push(format!("Buy near {:.4}, sell near {:.4}", buy, sell));
    }

    let summary = if clauses.is_empty() {
        "Not enough history for indicators yet.".to_string()
    } else {
        clauses.join(". ") + "."
    };

    Narrative {
        rsi_zone,
        momentum,
        trend,
        band,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ANALYSIS;

    fn snapshot(rsi: Option<f64>, hist: Option<f64>, ema: Option<f64>) -> IndicatorSnapshot {
        IndicatorSnapshot {
            rsi,
            ema,
            macd_histogram: hist,
            ..Default::default()
        }
    }

    #[test]
    fn overbought_bullish_above() {
        let n = build_narrative(110.0, &snapshot(Some(75.0), Some(0.3), Some(100.0)), &ANALYSIS.narrative);
        assert_eq!(n.rsi_zone, Some(RsiZone::Overbought));
        assert_eq!(n.momentum, Some(Momentum::Bullish));
        assert_eq!(n.trend, Some(TrendBias::AboveEma));
        assert!(n.summary.contains("overbought"));
        assert!(n.summary.contains("bullish momentum"));
        assert!(n.summary.contains("above EMA"));

        let (buy, sell) = n.band.unwrap();
        assert!((buy - 98.0).abs() < 1e-9);
        assert!((sell - 102.0).abs() < 1e-9);
    }

    #[test]
    fn oversold_bearish_below_and_flat() {
        let n = build_narrative(90.0, &snapshot(Some(25.0), Some(-0.1), Some(100.0)), &ANALYSIS.narrative);
        assert!(n.summary.contains("oversold"));
        assert!(n.summary.contains("bearish momentum"));
        assert!(n.summary.contains("below EMA"));

        let n = build_narrative(100.0, &snapshot(Some(50.0), Some(0.0), Some(100.0)), &ANALYSIS.narrative);
        assert_eq!(n.rsi_zone, Some(RsiZone::Neutral));
        assert!(n.summary.contains("flat momentum"));
        assert!(n.summary.contains("at EMA"));
    }

    #[test]
    fn thresholds_are_exclusive() {
        let n = build_narrative(1.0, &snapshot(Some(70.0), None, None), &ANALYSIS.narrative);
        assert_eq!(n.rsi_zone, Some(RsiZone::Neutral));
        let n = build_narrative(1.0, &snapshot(Some(30.0), None, None), &ANALYSIS.narrative);
        assert_eq!(n.rsi_zone, Some(RsiZone::Neutral));
    }

    #[test]
    fn warming_up_indicators_are_skipped() {
        let n = build_narrative(1.0, &IndicatorSnapshot::default(), &ANALYSIS.narrative);
        assert_eq!(n.band, None);
        assert_eq!(n.momentum, None);
        assert_eq!(n.summary, "Not enough history for indicators yet.");
    }
}
