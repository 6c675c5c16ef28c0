use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::config::{ANALYSIS, AnalysisConfig};
#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::data::price_stream::{ConnectionStatus, LiveSubscription, LiveTickFeed, TickHandler};
use crate::data::providers::{ProviderAttempt, ProviderId};
use crate::data::resolver::{ResolutionOutcome, SourceResolver};
use crate::domain::candle::{closes, typical_step_ms};
use crate::domain::symbol::normalize_symbol;
use crate::domain::{Candle, Interval, PricePoint, SeriesWindow};
use crate::engine::narrative::build_narrative;
use crate::models::forecast::predict_next_with_window;
use crate::models::{Analysis, AnalysisResult, IndicatorSnapshot};
use crate::utils::now_ms;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    Loading { interval: Interval },
    Loaded { provider: ProviderId, candles: usize },
    NoData,
    /// Live updates requested from the trade stream
    LiveRequested,
    /// No live updates for this symbol; the chart stays on loaded history
    LiveUnavailable,
}

/// Receives everything the session publishes. Calls come from whichever task
/// produced the update, so implementations must be cheap and thread-safe.
pub trait DashboardObserver: Send + Sync {
    fn on_analysis_updated(&self, result: Arc<AnalysisResult>);
    fn on_live_price(&self, symbol: &str, point: PricePoint);
    fn on_status(&self, _symbol: &str, _status: SessionStatus) {}
}

/// What happened to an `analyze` request.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzeOutcome {
    Current(Arc<AnalysisResult>),
    /// A newer request started before this one finished; nothing was published
    Superseded,
}

#[derive(Default)]
struct SessionState {
    current_symbol: Option<String>,
    series: SeriesWindow,
    last_result: Option<Arc<AnalysisResult>>,
    subscription: Option<LiveSubscription>,
    live_price: Option<f64>,
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs the indicator, forecast and narrative pipeline over resolved candles.
pub fn build_analysis(
    symbol: &str,
    interval: Interval,
    source: ProviderId,
    candles: &[Candle],
    attempts: Vec<ProviderAttempt>,
    config: &AnalysisConfig,
) -> Option<Analysis> {
    let latest = candles.last()?;
    let close = closes(candles);
    let (snapshot, lines) = IndicatorSnapshot::compute(candles, &config.indicators);
    let forecast = predict_next_with_window(&close, config.forecast_window);
    let narrative = build_narrative(latest.close, &snapshot, &config.narrative);

    Some(Analysis {
        symbol: symbol.to_string(),
        interval,
        source,
        latest_price: latest.close,
        source_step_ms: typical_step_ms(candles),
        snapshot,
        forecast,
        narrative,
        history: candles
            .iter()
            .map(|c| PricePoint {
                timestamp_ms: c.timestamp_ms,
                price: c.close,
            })
            .collect(),
        lines,
        attempts,
        generated_at_ms: now_ms(),
    })
}

/// Owns the displayed symbol, its working series and its live subscription.
///
/// `analyze` may be called concurrently; only the most recently started
/// request is allowed to publish. The series is only ever replaced whole.
pub struct DashboardSession {
    resolver: Mutex<Arc<SourceResolver>>,
    feed: LiveTickFeed,
    observer: Arc<dyn DashboardObserver>,
    state: Arc<Mutex<SessionState>>,
    generation: AtomicU64,
    config: AnalysisConfig,
}

impl DashboardSession {
    pub fn new(
        resolver: SourceResolver,
        feed: LiveTickFeed,
        observer: Arc<dyn DashboardObserver>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            resolver: Mutex::new(Arc::new(resolver)),
            feed,
            observer,
            state: Arc::new(Mutex::new(SessionState {
                series: SeriesWindow::with_capacity(config.series_capacity),
                ..Default::default()
            })),
            generation: AtomicU64::new(0),
            config,
        }
    }

    /// Production wiring: standard provider chain and the exchange trade feed.
    pub fn standard(backend_url: &str, observer: Arc<dyn DashboardObserver>) -> Self {
        Self::new(
            SourceResolver::standard(backend_url),
            LiveTickFeed::default(),
            observer,
            ANALYSIS,
        )
    }

    /// Swaps the provider chain (new backend endpoint). Requests still in
    /// flight on the old chain are superseded and never publish.
    pub fn set_resolver(&self, resolver: SourceResolver) {
        let _state = lock(&self.state);
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.resolver.lock().unwrap_or_else(PoisonError::into_inner) = Arc::new(resolver);
    }

    pub async fn analyze(&self, symbol: &str, interval: Interval) -> AnalyzeOutcome {
        let symbol = normalize_symbol(symbol);

        // Generation and symbol change together so ticks follow the request that wins
        let generation = {
            let mut state = lock(&self.state);
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            if state.current_symbol.as_deref() != Some(symbol.as_str()) {
                // Dropping the handle closes the previous symbol's stream
                state.subscription = None;
                state.live_price = None;
                state.current_symbol = Some(symbol.clone());
            }
            generation
        };
        self.observer
            .on_status(&symbol, SessionStatus::Loading { interval });

        let resolver = self
            .resolver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let resolution = resolver
            .resolve(&symbol, interval, self.config.kline_limit)
            .await;

        let (result, candles) = match resolution.outcome {
            ResolutionOutcome::Resolved { provider, candles } => {
                match build_analysis(
                    &symbol,
                    interval,
                    provider,
                    &candles,
                    resolution.attempts.clone(),
                    &self.config,
                ) {
                    Some(analysis) => (AnalysisResult::Ready(Box::new(analysis)), candles),
                    None => (self.no_data(&symbol, interval, resolution.attempts), Vec::new()),
                }
            }
            ResolutionOutcome::Exhausted => {
                (self.no_data(&symbol, interval, resolution.attempts), Vec::new())
            }
        };
        let result = Arc::new(result);

        let mut state = lock(&self.state);
        if self.generation.load(Ordering::SeqCst) != generation {
            #[cfg(debug_assertions)]
            if DEBUG_FLAGS.print_stale_results {
                log::info!("[session] Discarding stale result for {} {}", symbol, interval);
            }
            return AnalyzeOutcome::Superseded;
        }

        state.series = SeriesWindow::from_candles(&candles, self.config.series_capacity);
        state.last_result = Some(result.clone());
        self.observer.on_analysis_updated(result.clone());

        match result.as_ref() {
            AnalysisResult::Ready(analysis) => {
                self.observer.on_status(
                    &symbol,
                    SessionStatus::Loaded {
                        provider: analysis.source,
                        candles: candles.len(),
                    },
                );
                let needs_feed = state
                    .subscription
                    .as_ref()
                    .is_none_or(LiveSubscription::is_finished);
                if needs_feed {
                    state.subscription = self.feed.subscribe(&symbol, self.tick_handler(&symbol));
                    let live = if state.subscription.is_some() {
                        SessionStatus::LiveRequested
                    } else {
                        SessionStatus::LiveUnavailable
                    };
                    self.observer.on_status(&symbol, live);
                }
            }
            AnalysisResult::NoData { .. } => {
                state.subscription = None;
                state.live_price = None;
                self.observer.on_status(&symbol, SessionStatus::NoData);
            }
        }

        AnalyzeOutcome::Current(result)
    }

    fn no_data(
        &self,
        symbol: &str,
        interval: Interval,
        attempts: Vec<ProviderAttempt>,
    ) -> AnalysisResult {
        AnalysisResult::NoData {
            symbol: symbol.to_string(),
            interval,
            attempts,
        }
    }

    /// The stream task only holds a weak reference, so dropping the session
    /// frees the state and with it the subscription.
    fn tick_handler(&self, symbol: &str) -> TickHandler {
        let state: Weak<Mutex<SessionState>> = Arc::downgrade(&self.state);
        let observer = self.observer.clone();
        let symbol = symbol.to_string();
        Arc::new(move |price| {
            if let Some(state) = state.upgrade() {
                apply_tick(&state, observer.as_ref(), &symbol, price);
            }
        })
    }

    /// Feeds one live price into the session as if it came from the stream.
    pub(crate) fn apply_tick(&self, symbol: &str, price: f64) -> Option<PricePoint> {
        apply_tick(&self.state, self.observer.as_ref(), symbol, price)
    }

    pub fn current_symbol(&self) -> Option<String> {
        lock(&self.state).current_symbol.clone()
    }

    pub fn last_result(&self) -> Option<Arc<AnalysisResult>> {
        lock(&self.state).last_result.clone()
    }

    pub fn live_price(&self) -> Option<f64> {
        lock(&self.state).live_price
    }

    pub fn series_snapshot(&self) -> Vec<PricePoint> {
        lock(&self.state).series.iter().copied().collect()
    }

    pub fn has_live_subscription(&self) -> bool {
        lock(&self.state).subscription.is_some()
    }

    pub fn live_status(&self) -> Option<ConnectionStatus> {
        lock(&self.state).subscription.as_ref().map(|s| s.status())
    }

    /// Whether this session would open a live feed for `symbol`.
    pub fn supports_live(&self, symbol: &str) -> bool {
        self.feed.supports(symbol)
    }
}

impl Drop for DashboardSession {
    fn drop(&mut self) {
        lock(&self.state).subscription = None;
    }
}

/// Ticks for a symbol that is no longer displayed are dropped.
fn apply_tick(
    state: &Mutex<SessionState>,
    observer: &dyn DashboardObserver,
    symbol: &str,
    price: f64,
) -> Option<PricePoint> {
    if !price.is_finite() || price <= 0.0 {
        return None;
    }
    let point = {
        let mut state = lock(state);
        if state.current_symbol.as_deref() != Some(symbol) {
            return None;
        }
        state.live_price = Some(price);
        state.series.push_tick(now_ms(), price)
    };
    observer.on_live_price(symbol, point);
    Some(point)
}
