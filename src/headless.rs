//! One-shot analysis without the window, for scripts and quick checks.

use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::Cli;
use crate::config::{ANALYSIS, JsonFileStore, UserSettings};
use crate::data::{LiveTickFeed, SourceResolver};
use crate::domain::PricePoint;
use crate::domain::symbol::normalize_symbol;
use crate::engine::{AnalyzeOutcome, DashboardObserver, DashboardSession, SessionStatus};
use crate::models::{AnalysisResult, Forecast};

/// Forwards session events to the log.
struct LogObserver;

impl DashboardObserver for LogObserver {
    fn on_analysis_updated(&self, result: Arc<AnalysisResult>) {
        log::info!("📊 Analysis ready for {}", result.symbol());
    }

    fn on_live_price(&self, symbol: &str, point: PricePoint) {
        log::info!("{} live {:.4}", symbol, point.price);
    }

    fn on_status(&self, symbol: &str, status: SessionStatus) {
        log::info!("{} {:?}", symbol, status);
    }
}

fn opt(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{:.*}", decimals, v))
        .unwrap_or_else(|| "-".to_string())
}

/// Plain-text rendering of a result, one fact per line.
pub fn format_report(result: &AnalysisResult) -> String {
    let mut out = String::new();
    match result {
        AnalysisResult::NoData {
            symbol,
            interval,
            attempts,
        } => {
            let _ = writeln!(out, "{} {}: no data available", symbol, interval);
            for attempt in attempts {
                let _ = writeln!(out, "  {}", attempt);
            }
        }
        AnalysisResult::Ready(a) => {
            let s = &a.snapshot;
            let _ = writeln!(
                out,
                "{} {} via {} ({} candles)",
                a.symbol,
                a.interval,
                a.source,
                a.history.len()
            );
            if a.is_coarser_than_requested() {
                if let Some(step) = a.source_step_ms {
                    let _ = writeln!(out, "note      source candles are {} s apart", step / 1000);
                }
            }
            let _ = writeln!(out, "price     {:.4}", a.latest_price);
            let _ = writeln!(out, "rsi       {}", opt(s.rsi, 2));
            let _ = writeln!(out, "ema       {}", opt(s.ema, 4));
            let _ = writeln!(out, "sma       {}", opt(s.sma, 4));
            let _ = writeln!(
                out,
                "macd      {} / {} / {}",
                opt(s.macd_line, 4),
                opt(s.macd_signal, 4),
                opt(s.macd_histogram, 4)
            );
            let _ = writeln!(out, "atr       {}", opt(s.atr, 4));
            match a.forecast {
                Forecast::Available(fit) => {
                    let _ = writeln!(out, "forecast  {:.4} (r2 {:.3})", fit.price, fit.r_squared);
                }
                Forecast::Unavailable => {
                    let _ = writeln!(out, "forecast  -");
                }
            }
            let _ = writeln!(out, "{}", a.narrative.summary);
        }
    }
    out
}

/// A session with the standard providers and no trade stream: nothing reads
/// live ticks in a one-shot run.
fn headless_session(backend_url: &str) -> DashboardSession {
    DashboardSession::new(
        SourceResolver::standard(backend_url),
        LiveTickFeed::disabled(),
        Arc::new(LogObserver),
        ANALYSIS,
    )
}

pub async fn run_headless(cli: &Cli) -> Result<String> {
    let store = JsonFileStore::open(&cli.settings)?;
    let settings = UserSettings::load(&store);

    let backend_url = cli.backend.clone().unwrap_or_else(|| settings.backend_url.clone());
    let symbol = cli
        .symbol
        .as_deref()
        .map(normalize_symbol)
        .or_else(|| settings.favorites.first().cloned())
        .context("No symbol given and no favorites configured")?;
    let interval = cli.interval.unwrap_or(ANALYSIS.default_interval);

    log::info!("🚀 Headless analysis of {} ({}) via {}", symbol, interval, backend_url);
    let session = headless_session(&backend_url);
    match session.analyze(&symbol, interval).await {
        AnalyzeOutcome::Current(result) => Ok(format_report(&result)),
        AnalyzeOutcome::Superseded => anyhow::bail!("Analysis of {} was superseded", symbol),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ProviderId;
    use crate::data::providers::{AttemptOutcome, ProviderAttempt, ProviderError};
    use crate::domain::Interval;

    #[test]
    fn headless_session_opens_no_trade_stream() {
        let session = headless_session("http://127.0.0.1:9");
        assert!(!session.supports_live("BTCUSDT"));
    }

    #[test]
    fn no_data_report_lists_attempts() {
        let result = AnalysisResult::NoData {
            symbol: "FOOUSDT".to_string(),
            interval: Interval::OneHour,
            attempts: vec![ProviderAttempt {
                provider: ProviderId::ConfiguredBackend,
                outcome: AttemptOutcome::Failed(ProviderError::EmptyResult),
            }],
        };
        let report = format_report(&result);
        assert!(report.starts_with("FOOUSDT 1h: no data available"));
        assert!(report.contains("backend: empty result"));
    }
}
