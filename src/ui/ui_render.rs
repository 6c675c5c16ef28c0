use eframe::egui::{
    CentralPanel, Context, Frame, Grid, RichText, ScrollArea, SidePanel, TopBottomPanel, Ui,
};

use crate::data::backend_api::{AiAnalysis, display_value};
use crate::data::price_stream::ConnectionStatus;
use crate::engine::SessionStatus;
use crate::models::{Analysis, AnalysisResult, Forecast};
use crate::ui::config::{UI_CONFIG, UI_TEXT};
use crate::ui::styles::UiStyleExt;
use crate::ui::ui_panels::{
    Panel, PortfolioEvent, PortfolioPanel, SettingsEvent, SettingsPanel, SymbolEvent, SymbolPanel,
};
use crate::ui::ui_plot_view::PlotView;
use crate::ui::utils::{
    colored_heading, colored_subsection_heading, format_optional, format_price, section_heading,
    signed_color, spaced_separator,
};

use super::app::PulseDashApp;

/// One-line description of a session status for the status bar.
pub fn status_text(symbol: &str, status: &SessionStatus) -> String {
    match status {
        SessionStatus::Loading { interval } => format!("Loading {} ({})…", symbol, interval),
        SessionStatus::Loaded { provider, candles } => {
            format!("{}: {} candles from {}", symbol, candles, provider)
        }
        SessionStatus::NoData => format!("{}: {}", symbol, UI_TEXT.no_data),
        SessionStatus::LiveRequested => "Live updates on".to_string(),
        SessionStatus::LiveUnavailable => "Live updates unavailable".to_string(),
    }
}

/// Status bar text for the open trade stream.
pub fn feed_status_text(status: ConnectionStatus) -> &'static str {
    match status {
        ConnectionStatus::Connecting => "Live feed connecting…",
        ConnectionStatus::Connected => "Live updates on",
        ConnectionStatus::Disconnected => "Live feed reconnecting…",
        ConnectionStatus::Stopped => "Live feed stopped",
    }
}

/// Percent change from `from` to `to`; `None` when `from` is zero.
pub fn pct_change(from: f64, to: f64) -> Option<f64> {
    (from != 0.0).then(|| (to - from) / from * 100.0)
}

impl PulseDashApp {
    pub(super) fn render_top_panel(&mut self, ctx: &Context) {
        TopBottomPanel::top("overview_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(colored_heading(UI_TEXT.app_title));
                ui.separator();
                ui.label_subdued(UI_TEXT.overview_heading);
                for entry in &self.overview {
                    ui.separator();
                    ui.label(RichText::new(entry.symbol.as_str()).strong());
                    match &entry.quote {
                        Some(quote) => {
                            ui.label(RichText::new(format_price(quote.price)).monospace());
                            ui.label(
                                RichText::new(format!("{}%", format_optional(quote.change_24h, 2)))
                                    .color(signed_color(quote.change_24h)),
                            );
                        }
                        None => ui.label_subdued(UI_TEXT.placeholder),
                    }
                }
            });
        });
    }

    pub(super) fn render_side_panel(&mut self, ctx: &Context) {
        let side_panel_frame = Frame::new().fill(UI_CONFIG.colors.side_panel);
        SidePanel::left("left_panel")
            .min_width(UI_CONFIG.side_panel_min_width)
            .frame(side_panel_frame)
            .show(ctx, |ui| {
                ScrollArea::vertical().id_salt("side_scroll").show(ui, |ui| {
                    let symbol_events = SymbolPanel::new(
                        &self.settings.favorites,
                        &self.prefs.symbol,
                        self.prefs.interval,
                        &mut self.custom_symbol,
                    )
                    .render(ui);

                    spaced_separator(ui);
                    let settings_events = SettingsPanel::new(
                        &mut self.backend_input,
                        &mut self.favorites_input,
                        &mut self.favorites_error,
                        self.tracked.as_ref(),
                        &self.prefs.symbol,
                    )
                    .render(ui);

                    let valuation = self.portfolio_valuation();
                    let portfolio_events =
                        PortfolioPanel::new(&valuation, &mut self.holding_draft).render(ui);

                    for event in symbol_events {
                        match event {
                            SymbolEvent::Select(symbol) => self.select_symbol(symbol),
                            SymbolEvent::Interval(interval) => self.select_interval(interval),
                            SymbolEvent::Refresh => self.refresh_all(),
                        }
                    }
                    for event in settings_events {
                        match event {
                            SettingsEvent::BackendUrl(url) => self.set_backend_url(url),
                            SettingsEvent::Favorites(list) => self.set_favorites(list),
                            SettingsEvent::Track(symbol) => self.set_tracked(symbol, true),
                            SettingsEvent::Untrack(symbol) => self.set_tracked(symbol, false),
                        }
                    }
                    for event in portfolio_events {
                        match event {
                            PortfolioEvent::Add(holding) => self.settings.holdings.push(holding),
                            PortfolioEvent::Remove(index) => {
                                if index < self.settings.holdings.len() {
                                    self.settings.holdings.remove(index);
                                }
                            }
                        }
                    }
                });
            });
    }

    pub(super) fn render_status_panel(&mut self, ctx: &Context) {
        TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                match &self.data_status {
                    Some(status @ SessionStatus::NoData) => {
                        ui.label_error(status_text(&self.prefs.symbol, status))
                    }
                    Some(status) => ui.label_subdued(status_text(&self.prefs.symbol, status)),
                    None => ui.label_subdued(UI_TEXT.loading),
                }
                match (self.feed_status, &self.live_status) {
                    (Some(ConnectionStatus::Stopped), _) => {
                        ui.separator();
                        ui.label_warning(feed_status_text(ConnectionStatus::Stopped));
                    }
                    (Some(feed), _) => {
                        ui.separator();
                        ui.label_subdued(feed_status_text(feed));
                    }
                    (None, Some(status)) => {
                        ui.separator();
                        ui.label_subdued(status_text(&self.prefs.symbol, status));
                    }
                    (None, None) => {}
                }
                ui.separator();
                ui.label_subdued(format!("Backend: {}", self.settings.backend_url));
            });
        });
    }

    pub(super) fn render_central_panel(&mut self, ctx: &Context) {
        let central_panel_frame = Frame::new().fill(UI_CONFIG.colors.central_panel);
        CentralPanel::default()
            .frame(central_panel_frame)
            .show(ctx, |ui| match self.analysis.as_deref() {
                None => {
                    ui.label_subdued(UI_TEXT.loading);
                }
                Some(AnalysisResult::NoData {
                    symbol, attempts, ..
                }) => {
                    section_heading(ui, symbol);
                    ui.label_error(UI_TEXT.no_data);
                    for attempt in attempts {
                        ui.label_subdued(attempt.to_string());
                    }
                }
                Some(AnalysisResult::Ready(analysis)) => {
                    ScrollArea::vertical().id_salt("central_scroll").show(ui, |ui| {
                        self.render_analysis(ui, analysis);
                    });
                }
            });
    }

    fn render_analysis(&self, ui: &mut Ui, analysis: &Analysis) {
        let price = self.live_price.unwrap_or(analysis.latest_price);
        ui.horizontal(|ui| {
            ui.heading(colored_heading(&analysis.symbol));
            ui.label(RichText::new(format_price(price)).heading().monospace());
            ui.label_subdued(format!("{} · {}", analysis.interval, analysis.source));
            if analysis.is_coarser_than_requested() {
                if let Some(step) = analysis.source_step_ms {
                    ui.label_warning(format!(
                        "source candles every {}",
                        format_step(step)
                    ));
                }
            }
        });

        self.plot_view
            .show_price_plot(ui, analysis, &self.series, self.live_price);

        ui.columns(2, |columns| {
            render_indicators(&mut columns[0], analysis);
            render_narrative(&mut columns[1], analysis, price);
            self.render_remote_forecast(&mut columns[1], price);
        });

        ui.label(colored_subsection_heading("RSI"));
        self.plot_view.show_rsi_plot(ui, analysis);
        ui.label(colored_subsection_heading("MACD"));
        self.plot_view.show_macd_plot(ui, analysis);

        spaced_separator(ui);
        self.render_ai(ui);
    }

    fn render_remote_forecast(&self, ui: &mut Ui, price: f64) {
        match &self.remote_forecast {
            Some((_, Ok(remote))) => {
                let change = pct_change(price, remote.predicted);
                ui.metric(
                    UI_TEXT.remote_forecast_label,
                    &format_price(remote.predicted),
                    signed_color(change),
                );
            }
            Some((_, Err(_))) | None => {
                ui.metric(
                    UI_TEXT.remote_forecast_label,
                    UI_TEXT.placeholder,
                    UI_CONFIG.colors.label,
                );
            }
        }
    }

    fn render_ai(&self, ui: &mut Ui) {
        ui.label(colored_subsection_heading(UI_TEXT.ai_heading));
        match &self.ai {
            None => ui.label_subdued(UI_TEXT.loading),
            Some((_, Err(message))) => ui.label_warning(message.as_str()),
            Some((_, Ok(ai))) => render_ai_fields(ui, ai, &self.plot_view),
        }
    }
}

fn render_indicators(ui: &mut Ui, analysis: &Analysis) {
    let s = &analysis.snapshot;
    ui.label(colored_subsection_heading(UI_TEXT.indicators_heading));
    Grid::new("indicator_grid")
        .num_columns(2)
        .striped(true)
        .show(ui, |ui| {
            let rows = [
                ("RSI", format_optional(s.rsi, 2)),
                ("EMA", format_optional(s.ema, 4)),
                ("SMA", format_optional(s.sma, 4)),
                ("MACD", format_optional(s.macd_line, 4)),
                ("Signal", format_optional(s.macd_signal, 4)),
                ("Histogram", format_optional(s.macd_histogram, 4)),
                ("ATR", format_optional(s.atr, 4)),
            ];
            for (name, value) in rows {
                ui.label_subdued(name);
                ui.label(RichText::new(value).monospace());
                ui.end_row();
            }
        });
}

fn render_narrative(ui: &mut Ui, analysis: &Analysis, price: f64) {
    ui.label(colored_subsection_heading(UI_TEXT.narrative_heading));
    ui.label(analysis.narrative.summary.as_str());
    if let Some((buy, sell)) = analysis.narrative.band {
        ui.metric("Buy near", &format_price(buy), UI_CONFIG.colors.bullish);
        ui.metric("Sell near", &format_price(sell), UI_CONFIG.colors.bearish);
    }

    ui.add_space(6.0);
    ui.label(colored_subsection_heading(UI_TEXT.forecast_heading));
    match analysis.forecast {
        Forecast::Available(fit) => {
            let change = pct_change(price, fit.price);
            ui.metric("Predicted", &format_price(fit.price), signed_color(change));
            ui.metric(
                "Change",
                &format!("{}%", format_optional(change, 2)),
                signed_color(change),
            );
            ui.label_subdued(format!("R² {:.3} over {} closes", fit.r_squared, fit.window_len));
        }
        Forecast::Unavailable => ui.label_subdued(UI_TEXT.placeholder),
    }
}

/// Compact duration for a candle spacing ("4h", "1d", "15m").
pub fn format_step(step_ms: i64) -> String {
    const MIN: i64 = 60_000;
    match step_ms {
        s if s % (24 * 60 * MIN) == 0 => format!("{}d", s / (24 * 60 * MIN)),
        s if s % (60 * MIN) == 0 => format!("{}h", s / (60 * MIN)),
        s if s % MIN == 0 => format!("{}m", s / MIN),
        s => format!("{}ms", s),
    }
}

fn render_ai_fields(ui: &mut Ui, ai: &AiAnalysis, plot_view: &PlotView) {
    let index = ai.index_or_neutral();
    let index_color = signed_color(Some(index - AiAnalysis::NEUTRAL_INDEX));
    ui.metric("Index", &format!("{:.0}", index), index_color);
    Grid::new("ai_grid").num_columns(2).show(ui, |ui| {
        let text = |v: &Option<String>| v.clone().unwrap_or_else(|| UI_TEXT.placeholder.into());
        let rows = [
            ("Sentiment", text(&ai.sentiment)),
            ("Technical", text(&ai.technical)),
            ("Fair value", display_value(ai.fair_value.as_ref())),
            ("Zones", display_value(ai.zones.as_ref())),
            ("Risk", text(&ai.risk)),
            ("Confidence", format_optional(ai.confidence, 0)),
        ];
        for (name, value) in rows {
            ui.label_subdued(name);
            ui.label(value);
            ui.end_row();
        }
    });
    if !ai.historical.is_empty() {
        ui.label_subdued(UI_TEXT.ai_history_label);
        plot_view.show_sparkline(ui, "ai_history", &ai.historical);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ProviderId;
    use crate::domain::Interval;

    #[test]
    fn status_lines() {
        assert_eq!(
            status_text(
                "BTCUSDT",
                &SessionStatus::Loaded {
                    provider: ProviderId::PublicMarketApi,
                    candles: 500
                }
            ),
            "BTCUSDT: 500 candles from market-data API"
        );
        assert_eq!(
            status_text(
                "ETHUSDT",
                &SessionStatus::Loading {
                    interval: Interval::FourHours
                }
            ),
            "Loading ETHUSDT (4h)…"
        );
        assert_eq!(
            status_text("XYZ", &SessionStatus::NoData),
            "XYZ: No data available"
        );
    }

    #[test]
    fn feed_states_read_plainly() {
        assert_eq!(feed_status_text(ConnectionStatus::Connected), "Live updates on");
        assert_eq!(feed_status_text(ConnectionStatus::Stopped), "Live feed stopped");
    }

    #[test]
    fn steps_print_in_the_largest_whole_unit() {
        assert_eq!(format_step(4 * 3_600_000), "4h");
        assert_eq!(format_step(86_400_000), "1d");
        assert_eq!(format_step(15 * 60_000), "15m");
    }

    #[test]
    fn pct_change_guards_zero() {
        assert_eq!(pct_change(100.0, 110.0), Some(10.0));
        assert_eq!(pct_change(0.0, 5.0), None);
    }
}
