use eframe::egui::Color32;

/// UI Colors for consistent theming
#[derive(Clone, Copy)]
pub struct UiColors {
    pub label: Color32,
    pub heading: Color32,
    pub subsection_heading: Color32,
    pub central_panel: Color32,
    pub side_panel: Color32,
    pub bullish: Color32,
    pub bearish: Color32,
    pub neutral: Color32,
    pub price_line: Color32,
    pub ema_line: Color32,
    pub forecast: Color32,
}

/// Main UI configuration struct that holds all UI-related settings
#[derive(Clone, Copy)]
pub struct UiConfig {
    pub colors: UiColors,
    /// Favorites shown in the market overview strip
    pub overview_count: usize,
    pub side_panel_min_width: f32,
}

pub static UI_CONFIG: UiConfig = UiConfig {
    colors: UiColors {
        label: Color32::GRAY,
        heading: Color32::from_rgb(240, 185, 11),
        subsection_heading: Color32::ORANGE,
        central_panel: Color32::from_rgb(18, 20, 26),
        side_panel: Color32::from_rgb(25, 25, 25),
        bullish: Color32::from_rgb(14, 203, 129),
        bearish: Color32::from_rgb(246, 70, 93),
        neutral: Color32::from_rgb(240, 185, 11),
        price_line: Color32::from_rgb(120, 170, 255),
        ema_line: Color32::from_rgb(240, 185, 11),
        forecast: Color32::from_rgb(200, 120, 255),
    },
    overview_count: 4,
    side_panel_min_width: 180.0,
};

/// All user-facing strings in one place
pub struct UiText {
    pub app_title: &'static str,
    pub symbols_heading: &'static str,
    pub interval_label: &'static str,
    pub refresh_button: &'static str,
    pub custom_symbol_hint: &'static str,
    pub analyze_button: &'static str,
    pub overview_heading: &'static str,
    pub indicators_heading: &'static str,
    pub narrative_heading: &'static str,
    pub forecast_heading: &'static str,
    pub ai_heading: &'static str,
    pub portfolio_heading: &'static str,
    pub settings_heading: &'static str,
    pub backend_label: &'static str,
    pub save_backend_button: &'static str,
    pub favorites_label: &'static str,
    pub save_favorites_button: &'static str,
    pub add_holding_button: &'static str,
    pub tracked_label: &'static str,
    pub track_button: &'static str,
    pub remote_forecast_label: &'static str,
    pub ai_history_label: &'static str,
    pub no_data: &'static str,
    pub loading: &'static str,
    pub placeholder: &'static str,
}

pub static UI_TEXT: UiText = UiText {
    app_title: "Pulse Dash",
    symbols_heading: "Symbols",
    interval_label: "Interval",
    refresh_button: "⟳ Refresh",
    custom_symbol_hint: "e.g. ADAUSDT",
    analyze_button: "Analyze",
    overview_heading: "Market overview",
    indicators_heading: "Indicators",
    narrative_heading: "Analysis",
    forecast_heading: "Next-candle forecast",
    ai_heading: "AI analysis",
    portfolio_heading: "Portfolio",
    settings_heading: "Settings",
    backend_label: "Backend endpoint",
    save_backend_button: "Save endpoint",
    favorites_label: "Favorites (comma separated)",
    save_favorites_button: "Save favorites",
    add_holding_button: "Add holding",
    tracked_label: "Tracked on backend",
    track_button: "Track",
    remote_forecast_label: "Backend",
    ai_history_label: "Recent history",
    no_data: "No data available",
    loading: "Loading…",
    placeholder: "—",
};
