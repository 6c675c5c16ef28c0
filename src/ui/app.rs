use std::sync::Arc;
use std::time::Duration;

use eframe::{Frame, egui};
use serde::{Deserialize, Serialize};

use crate::config::settings::DEFAULT_FAVORITES;
use crate::config::{ANALYSIS, KeyValueStore, UserSettings};
use crate::data::BackendClient;
use crate::data::price_stream::ConnectionStatus;
use crate::data::resolver::SourceResolver;
use crate::data::backend_api::{AiAnalysis, RemoteForecast};
use crate::domain::symbol::normalize_symbol;
use crate::domain::{Interval, PricePoint};
use crate::engine::{DashboardSession, SessionStatus};
use crate::models::{AnalysisResult, PortfolioValuation};
use crate::ui::app_async::{OverviewEntry, TaskSpawner, UiMailbox};
use crate::ui::config::UI_CONFIG;
use crate::ui::ui_panels::HoldingDraft;
use crate::ui::ui_plot_view::PlotView;
use crate::ui::utils::setup_custom_visuals;

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;

/// eframe storage doubles as the settings store, so the desktop and web
/// builds keep `apiEndpoint`, `favorites` and `portfolio` under the same keys.
impl KeyValueStore for dyn eframe::Storage + '_ {
    fn get_string(&self, key: &str) -> Option<String> {
        eframe::Storage::get_string(self, key)
    }

    fn set_string(&mut self, key: &str, value: String) {
        eframe::Storage::set_string(self, key, value);
    }
}

/// View state that survives restarts alongside the user settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiPrefs {
    pub symbol: String,
    pub interval: Interval,
}

impl Default for UiPrefs {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_FAVORITES[0].to_string(),
            interval: ANALYSIS.default_interval,
        }
    }
}

/// Command-line values that take precedence over stored settings.
#[derive(Debug, Clone, Default)]
pub struct StartupOverrides {
    pub backend_url: Option<String>,
    pub symbol: Option<String>,
    pub interval: Option<Interval>,
}

pub struct PulseDashApp {
    pub(super) settings: UserSettings,
    pub(super) prefs: UiPrefs,
    pub(super) session: Arc<DashboardSession>,
    pub(super) backend: BackendClient,
    pub(super) mailbox: Arc<UiMailbox>,
    pub(super) spawner: TaskSpawner,
    pub(super) plot_view: PlotView,

    // Latest published state
    pub(super) analysis: Option<Arc<AnalysisResult>>,
    pub(super) series: Vec<PricePoint>,
    pub(super) live_price: Option<f64>,
    pub(super) data_status: Option<SessionStatus>,
    pub(super) live_status: Option<SessionStatus>,
    /// Connection state of the open trade stream, polled each frame
    pub(super) feed_status: Option<ConnectionStatus>,
    pub(super) overview: Vec<OverviewEntry>,
    pub(super) ai: Option<(String, Result<AiAnalysis, String>)>,
    pub(super) remote_forecast: Option<(String, Result<RemoteForecast, String>)>,
    /// Symbols the backend tracks
    pub(super) tracked: Option<Result<Vec<String>, String>>,

    // Edit buffers
    pub(super) custom_symbol: String,
    pub(super) backend_input: String,
    pub(super) favorites_input: String,
    pub(super) favorites_error: bool,
    pub(super) holding_draft: HoldingDraft,
}

impl PulseDashApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        spawner: TaskSpawner,
        overrides: StartupOverrides,
    ) -> Self {
        let (mut settings, mut prefs) = match cc.storage {
            Some(storage) => {
                let prefs = eframe::get_value(storage, eframe::APP_KEY).unwrap_or_default();
                (UserSettings::load(storage), prefs)
            }
            None => (UserSettings::default(), UiPrefs::default()),
        };

        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_settings_serde {
            log::info!("Loaded settings: {:?} / {:?}", settings, prefs);
        }

        if let Some(url) = overrides.backend_url {
            settings.backend_url = url.trim_end_matches('/').to_string();
        }
        if let Some(symbol) = overrides.symbol.map(|s| normalize_symbol(&s)) {
            if !symbol.is_empty() {
                prefs.symbol = symbol;
            }
        }
        if let Some(interval) = overrides.interval {
            prefs.interval = interval;
        }

        let mailbox = Arc::new(UiMailbox::new(cc.egui_ctx.clone()));
        let session = Arc::new(DashboardSession::standard(
            &settings.backend_url,
            mailbox.clone(),
        ));

        let mut app = Self {
            backend: BackendClient::new(&settings.backend_url),
            backend_input: settings.backend_url.clone(),
            favorites_input: settings.favorites.join(", "),
            settings,
            prefs,
            session,
            mailbox,
            spawner,
            plot_view: PlotView::new(),
            analysis: None,
            series: Vec::new(),
            live_price: None,
            data_status: None,
            live_status: None,
            feed_status: None,
            overview: Vec::new(),
            ai: None,
            remote_forecast: None,
            tracked: None,
            custom_symbol: String::new(),
            favorites_error: false,
            holding_draft: HoldingDraft::default(),
        };
        app.refresh_all();
        app
    }

    pub(super) fn request_analysis(&self) {
        let session = Arc::clone(&self.session);
        let symbol = self.prefs.symbol.clone();
        let interval = self.prefs.interval;
        self.spawner.spawn(async move {
            session.analyze(&symbol, interval).await;
        });
    }

    pub(super) fn request_overview(&self) {
        let backend = self.backend.clone();
        let mailbox = Arc::clone(&self.mailbox);
        let symbols: Vec<String> = self
            .settings
            .favorites
            .iter()
            .take(UI_CONFIG.overview_count)
            .cloned()
            .collect();
        self.spawner.spawn(async move {
            let mut entries = Vec::with_capacity(symbols.len());
            for symbol in symbols {
                let quote = match backend.price(&symbol).await {
                    Ok(quote) => Some(quote),
                    Err(e) => {
                        log::warn!("⚠️  Overview price for {} unavailable: {:#}", symbol, e);
                        None
                    }
                };
                entries.push(OverviewEntry { symbol, quote });
            }
            mailbox.post_overview(entries);
        });
    }

    pub(super) fn request_ai(&self) {
        let backend = self.backend.clone();
        let mailbox = Arc::clone(&self.mailbox);
        let symbol = self.prefs.symbol.clone();
        self.spawner.spawn(async move {
            let result = backend
                .ai_analysis(&symbol)
                .await
                .map_err(|e| format!("{:#}", e));
            mailbox.post_ai(symbol, result);
        });
    }

    pub(super) fn request_remote_forecast(&self) {
        let backend = self.backend.clone();
        let mailbox = Arc::clone(&self.mailbox);
        let symbol = self.prefs.symbol.clone();
        self.spawner.spawn(async move {
            let result = backend.predict(&symbol).await.map_err(|e| format!("{:#}", e));
            mailbox.post_remote_forecast(symbol, result);
        });
    }

    pub(super) fn request_tracked(&self) {
        let backend = self.backend.clone();
        let mailbox = Arc::clone(&self.mailbox);
        self.spawner.spawn(async move {
            let result = backend.list_symbols().await.map_err(|e| format!("{:#}", e));
            mailbox.post_tracked(result);
        });
    }

    /// Adds or removes a backend-tracked symbol, then reloads the list.
    pub(super) fn set_tracked(&self, symbol: String, tracked: bool) {
        let backend = self.backend.clone();
        let mailbox = Arc::clone(&self.mailbox);
        self.spawner.spawn(async move {
            let change = if tracked {
                backend.add_symbol(&symbol).await
            } else {
                backend.remove_symbol(&symbol).await
            };
            if let Err(e) = change {
                log::warn!("⚠️  Updating tracked symbol {} failed: {:#}", symbol, e);
            }
            let result = backend.list_symbols().await.map_err(|e| format!("{:#}", e));
            mailbox.post_tracked(result);
        });
    }

    pub(super) fn refresh_all(&mut self) {
        self.request_analysis();
        self.request_overview();
        self.request_ai();
        self.request_remote_forecast();
        self.request_tracked();
    }

    pub(super) fn select_symbol(&mut self, symbol: String) {
        if symbol == self.prefs.symbol {
            return;
        }
        self.prefs.symbol = symbol;
        self.live_price = None;
        self.live_status = None;
        self.ai = None;
        self.remote_forecast = None;
        self.request_analysis();
        self.request_ai();
        self.request_remote_forecast();
    }

    pub(super) fn select_interval(&mut self, interval: Interval) {
        self.prefs.interval = interval;
        self.request_analysis();
    }

    /// Points the provider chain and the auxiliary client at a new backend.
    /// Analyses still running against the old one are discarded.
    pub(super) fn set_backend_url(&mut self, url: String) {
        log::info!("🔧 Backend endpoint set to {}", url);
        self.settings.backend_url = url;
        self.backend_input = self.settings.backend_url.clone();
        self.backend = BackendClient::new(&self.settings.backend_url);
        self.session
            .set_resolver(SourceResolver::standard(&self.settings.backend_url));
        self.analysis = None;
        self.series.clear();
        self.live_price = None;
        self.live_status = None;
        self.refresh_all();
    }

    pub(super) fn set_favorites(&mut self, favorites: Vec<String>) {
        self.favorites_input = favorites.join(", ");
        self.settings.favorites = favorites;
        self.request_overview();
    }

    /// Best known price for a symbol: live tick, then the loaded history,
    /// then the overview quote.
    pub(super) fn price_of(&self, symbol: &str) -> Option<f64> {
        let displayed = self
            .analysis
            .as_deref()
            .and_then(AnalysisResult::as_ready)
            .filter(|a| a.symbol == symbol);
        if let Some(analysis) = displayed {
            return self.live_price.or(Some(analysis.latest_price));
        }
        self.overview
            .iter()
            .find(|entry| entry.symbol == symbol)
            .and_then(|entry| entry.quote.as_ref())
            .map(|quote| quote.price)
    }

    pub(super) fn portfolio_valuation(&self) -> PortfolioValuation {
        PortfolioValuation::value(&self.settings.holdings, |symbol| self.price_of(symbol))
    }

    fn drain_mailbox(&mut self) {
        let inbox = self.mailbox.take();

        if let Some(result) = inbox.analysis {
            self.series = self.session.series_snapshot();
            self.live_price = self.session.live_price();
            self.analysis = Some(result);
        }
        if let Some((symbol, point)) = inbox.latest_tick {
            if symbol == self.prefs.symbol {
                self.live_price = Some(point.price);
                self.series = self.session.series_snapshot();
            }
        }
        for (symbol, status) in inbox.statuses {
            if symbol != self.prefs.symbol {
                continue;
            }
            match status {
                SessionStatus::LiveRequested | SessionStatus::LiveUnavailable => {
                    self.live_status = Some(status)
                }
                SessionStatus::NoData => {
                    self.live_status = None;
                    self.data_status = Some(status);
                }
                _ => self.data_status = Some(status),
            }
        }
        if let Some(overview) = inbox.overview {
            self.overview = overview;
        }
        if let Some(ai) = inbox.ai {
            if ai.0 == self.prefs.symbol {
                self.ai = Some(ai);
            }
        }
        if let Some(forecast) = inbox.remote_forecast {
            if forecast.0 == self.prefs.symbol {
                self.remote_forecast = Some(forecast);
            }
        }
        if let Some(tracked) = inbox.tracked {
            self.tracked = Some(tracked);
        }
    }
}

impl eframe::App for PulseDashApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.settings.save(storage);
        eframe::set_value(storage, eframe::APP_KEY, &self.prefs);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        setup_custom_visuals(ctx);

        self.drain_mailbox();
        self.feed_status = self.session.live_status();
        // Stream state changes without ticks still need to reach the status bar
        if matches!(
            self.feed_status,
            Some(ConnectionStatus::Connecting | ConnectionStatus::Disconnected)
        ) {
            ctx.request_repaint_after(Duration::from_secs(1));
        }

        self.render_top_panel(ctx);
        self.render_side_panel(ctx);
        self.render_status_panel(ctx);
        self.render_central_panel(ctx);
    }
}
