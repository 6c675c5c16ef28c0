//! Bridges background work into the egui frame loop.
//!
//! Tasks and the session publish into [`UiMailbox`]; `update()` drains it once
//! per frame. Every post requests a repaint so results show up promptly.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use eframe::egui;

use crate::data::backend_api::{AiAnalysis, RemoteForecast, SpotQuote};
use crate::domain::PricePoint;
use crate::engine::{DashboardObserver, SessionStatus};
use crate::models::AnalysisResult;

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;

#[derive(Debug, Clone)]
pub struct OverviewEntry {
    pub symbol: String,
    pub quote: Option<SpotQuote>,
}

#[derive(Default)]
pub(super) struct Inbox {
    pub analysis: Option<Arc<AnalysisResult>>,
    pub latest_tick: Option<(String, PricePoint)>,
    pub statuses: Vec<(String, SessionStatus)>,
    pub overview: Option<Vec<OverviewEntry>>,
    pub ai: Option<(String, Result<AiAnalysis, String>)>,
    pub remote_forecast: Option<(String, Result<RemoteForecast, String>)>,
    pub tracked: Option<Result<Vec<String>, String>>,
}

pub struct UiMailbox {
    inbox: Mutex<Inbox>,
    ctx: egui::Context,
}

impl UiMailbox {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            inbox: Mutex::new(Inbox::default()),
            ctx,
        }
    }

    fn inbox(&self) -> MutexGuard<'_, Inbox> {
        self.inbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn post(&self, f: impl FnOnce(&mut Inbox)) {
        f(&mut self.inbox());
        self.ctx.request_repaint();
    }

    pub(super) fn take(&self) -> Inbox {
        std::mem::take(&mut *self.inbox())
    }

    pub fn post_overview(&self, entries: Vec<OverviewEntry>) {
        self.post(|inbox| inbox.overview = Some(entries));
    }

    pub fn post_ai(&self, symbol: String, result: Result<AiAnalysis, String>) {
        self.post(|inbox| inbox.ai = Some((symbol, result)));
    }

    pub fn post_remote_forecast(&self, symbol: String, result: Result<RemoteForecast, String>) {
        self.post(|inbox| inbox.remote_forecast = Some((symbol, result)));
    }

    pub fn post_tracked(&self, result: Result<Vec<String>, String>) {
        self.post(|inbox| inbox.tracked = Some(result));
    }
}

impl DashboardObserver for UiMailbox {
    fn on_analysis_updated(&self, result: Arc<AnalysisResult>) {
        self.post(|inbox| inbox.analysis = Some(result));
    }

    // Only the newest tick matters; the series itself lives in the session.
    fn on_live_price(&self, symbol: &str, point: PricePoint) {
        self.post(|inbox| inbox.latest_tick = Some((symbol.to_string(), point)));
    }

    fn on_status(&self, symbol: &str, status: SessionStatus) {
        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_ui_interactions {
            log::info!("[ui] {} status {:?}", symbol, status);
        }
        self.post(|inbox| inbox.statuses.push((symbol.to_string(), status)));
    }
}

/// Runs futures on the tokio runtime (native) or the browser event loop (wasm).
#[derive(Clone)]
pub struct TaskSpawner {
    #[cfg(not(target_arch = "wasm32"))]
    handle: tokio::runtime::Handle,
}

impl TaskSpawner {
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Self {
        Self {}
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.handle.spawn(future);
    }

    #[cfg(target_arch = "wasm32")]
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + 'static,
    {
        wasm_bindgen_futures::spawn_local(future);
    }
}
