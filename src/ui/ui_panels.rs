use eframe::egui::{ComboBox, Grid, RichText, ScrollArea, TextEdit, Ui};
use strum::IntoEnumIterator;

use crate::domain::Interval;
use crate::domain::symbol::normalize_symbol;
use crate::models::{Holding, PortfolioValuation};
use crate::ui::config::{UI_CONFIG, UI_TEXT};
use crate::ui::styles::UiStyleExt;
use crate::ui::utils::{
    colored_subsection_heading, format_optional, format_price, section_heading, signed_color,
    spaced_separator,
};

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;

/// Trait for UI panels that can be rendered
pub trait Panel {
    type Event;
    fn render(&mut self, ui: &mut Ui) -> Vec<Self::Event>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolEvent {
    Select(String),
    Interval(Interval),
    Refresh,
}

/// Favorites list, free-form symbol entry and the interval picker.
pub struct SymbolPanel<'a> {
    favorites: &'a [String],
    selected: &'a str,
    interval: Interval,
    custom_input: &'a mut String,
}

impl<'a> SymbolPanel<'a> {
    pub fn new(
        favorites: &'a [String],
        selected: &'a str,
        interval: Interval,
        custom_input: &'a mut String,
    ) -> Self {
        Self {
            favorites,
            selected,
            interval,
            custom_input,
        }
    }

    fn render_favorites(&mut self, ui: &mut Ui) -> Option<String> {
        let mut changed = None;
        ScrollArea::vertical()
            .max_height(200.)
            .id_salt("favorites")
            .show(ui, |ui| {
                for symbol in self.favorites {
                    let is_selected = symbol == self.selected;
                    if ui.selectable_label(is_selected, symbol.as_str()).clicked() && !is_selected {
                        changed = Some(symbol.clone());
                    }
                }
            });
        changed
    }

    fn render_custom_symbol(&mut self, ui: &mut Ui) -> Option<String> {
        let mut submitted = false;
        ui.horizontal(|ui| {
            let response = ui.add(
                TextEdit::singleline(self.custom_input)
                    .hint_text(UI_TEXT.custom_symbol_hint)
                    .desired_width(100.0),
            );
            let enter = response.lost_focus()
                && ui.input(|i| i.key_pressed(eframe::egui::Key::Enter));
            if ui.button(UI_TEXT.analyze_button).clicked() || enter {
                submitted = true;
            }
        });
        if !submitted {
            return None;
        }
        let symbol = normalize_symbol(self.custom_input);
        (!symbol.is_empty()).then(|| {
            self.custom_input.clear();
            symbol
        })
    }

    fn render_interval(&mut self, ui: &mut Ui) -> Option<Interval> {
        let mut chosen = self.interval;
        ui.horizontal(|ui| {
            ui.label_subdued(UI_TEXT.interval_label);
            ComboBox::from_id_salt("interval")
                .selected_text(chosen.to_string())
                .show_ui(ui, |ui| {
                    for interval in Interval::iter() {
                        ui.selectable_value(&mut chosen, interval, interval.to_string());
                    }
                });
        });
        (chosen != self.interval).then_some(chosen)
    }
}

impl Panel for SymbolPanel<'_> {
    type Event = SymbolEvent;

    fn render(&mut self, ui: &mut Ui) -> Vec<SymbolEvent> {
        let mut events = Vec::new();
        section_heading(ui, UI_TEXT.symbols_heading);

        if let Some(symbol) = self.render_favorites(ui) {
            events.push(SymbolEvent::Select(symbol));
        }
        ui.add_space(4.0);
        if let Some(symbol) = self.render_custom_symbol(ui) {
            events.push(SymbolEvent::Select(symbol));
        }
        ui.add_space(4.0);
        if let Some(interval) = self.render_interval(ui) {
            events.push(SymbolEvent::Interval(interval));
        }
        if ui.button(UI_TEXT.refresh_button).clicked() {
            events.push(SymbolEvent::Refresh);
        }

        #[cfg(debug_assertions)]
        if DEBUG_FLAGS.print_ui_interactions && !events.is_empty() {
            log::info!("[ui] symbol panel events: {:?}", events);
        }
        events
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsEvent {
    BackendUrl(String),
    Favorites(Vec<String>),
    Track(String),
    Untrack(String),
}

/// Backend endpoint and favorites editor. Edits stay in the buffers until saved.
pub struct SettingsPanel<'a> {
    backend_input: &'a mut String,
    favorites_input: &'a mut String,
    favorites_error: &'a mut bool,
    tracked: Option<&'a Result<Vec<String>, String>>,
    current_symbol: &'a str,
}

impl<'a> SettingsPanel<'a> {
    pub fn new(
        backend_input: &'a mut String,
        favorites_input: &'a mut String,
        favorites_error: &'a mut bool,
        tracked: Option<&'a Result<Vec<String>, String>>,
        current_symbol: &'a str,
    ) -> Self {
        Self {
            backend_input,
            favorites_input,
            favorites_error,
            tracked,
            current_symbol,
        }
    }

    fn render_tracked(&self, ui: &mut Ui) -> Option<SettingsEvent> {
        let mut event = None;
        ui.label_subdued(UI_TEXT.tracked_label);
        match self.tracked {
            None => ui.label_subdued(UI_TEXT.loading),
            Some(Err(message)) => ui.label_warning(message.as_str()),
            Some(Ok(symbols)) => {
                for symbol in symbols {
                    ui.horizontal(|ui| {
                        ui.label(symbol.as_str());
                        if ui.small_button("✖").clicked() {
                            event = Some(SettingsEvent::Untrack(symbol.clone()));
                        }
                    });
                }
                let already = symbols.iter().any(|s| s == self.current_symbol);
                if !already
                    && ui
                        .button(format!("{} {}", UI_TEXT.track_button, self.current_symbol))
                        .clicked()
                {
                    event = Some(SettingsEvent::Track(self.current_symbol.to_string()));
                }
            }
        }
        event
    }
}

impl Panel for SettingsPanel<'_> {
    type Event = SettingsEvent;

    fn render(&mut self, ui: &mut Ui) -> Vec<SettingsEvent> {
        let mut events = Vec::new();
        ui.collapsing(colored_subsection_heading(UI_TEXT.settings_heading), |ui| {
            ui.label_subdued(UI_TEXT.backend_label);
            ui.text_edit_singleline(self.backend_input);
            if ui.button(UI_TEXT.save_backend_button).clicked() {
                let url = self.backend_input.trim().trim_end_matches('/').to_string();
                if !url.is_empty() {
                    events.push(SettingsEvent::BackendUrl(url));
                }
            }

            ui.add_space(6.0);
            ui.label_subdued(UI_TEXT.favorites_label);
            ui.text_edit_singleline(self.favorites_input);
            if ui.button(UI_TEXT.save_favorites_button).clicked() {
                match crate::config::UserSettings::parse_favorites(self.favorites_input) {
                    Some(list) => {
                        *self.favorites_error = false;
                        events.push(SettingsEvent::Favorites(list));
                    }
                    None => *self.favorites_error = true,
                }
            }
            if *self.favorites_error {
                ui.label_error("Enter at least one symbol");
            }

            ui.add_space(6.0);
            if let Some(event) = self.render_tracked(ui) {
                events.push(event);
            }
        });
        events
    }
}

/// Text buffers for the "add holding" row.
#[derive(Debug, Clone, Default)]
pub struct HoldingDraft {
    pub symbol: String,
    pub quantity: String,
    pub cost_basis: String,
}

impl HoldingDraft {
    /// A holding needs a symbol and a positive quantity; cost may be zero.
    pub fn parse(&self) -> Option<Holding> {
        let symbol = normalize_symbol(&self.symbol);
        let quantity: f64 = self.quantity.trim().parse().ok()?;
        let cost_basis: f64 = self.cost_basis.trim().parse().ok()?;
        let valid = !symbol.is_empty()
            && quantity.is_finite()
            && quantity > 0.0
            && cost_basis.is_finite()
            && cost_basis >= 0.0;
        valid.then_some(Holding {
            symbol,
            quantity,
            cost_basis,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PortfolioEvent {
    Add(Holding),
    Remove(usize),
}

pub struct PortfolioPanel<'a> {
    valuation: &'a PortfolioValuation,
    draft: &'a mut HoldingDraft,
}

impl<'a> PortfolioPanel<'a> {
    pub fn new(valuation: &'a PortfolioValuation, draft: &'a mut HoldingDraft) -> Self {
        Self { valuation, draft }
    }

    fn render_positions(&self, ui: &mut Ui) -> Option<usize> {
        let mut removed = None;
        Grid::new("portfolio_grid")
            .striped(true)
            .num_columns(4)
            .show(ui, |ui| {
                for (index, position) in self.valuation.positions.iter().enumerate() {
                    ui.label(position.symbol.as_str());
                    ui.label(
                        position
                            .market_value
                            .map(format_price)
                            .unwrap_or_else(|| UI_TEXT.placeholder.to_string()),
                    );
                    ui.label(
                        RichText::new(format!("{}%", format_optional(position.pnl_pct, 2)))
                            .color(signed_color(position.pnl)),
                    );
                    if ui.small_button("✖").clicked() {
                        removed = Some(index);
                    }
                    ui.end_row();
                }
            });
        removed
    }

    fn render_totals(&self, ui: &mut Ui) {
        let pnl = self.valuation.total_pnl();
        ui.metric("Value", &format_price(self.valuation.total_value), UI_CONFIG.colors.heading);
        ui.metric("P&L", &format_price(pnl), signed_color(Some(pnl)));
        if self.valuation.unpriced > 0 {
            ui.label_warning(format!("{} holding(s) without a price", self.valuation.unpriced));
        }
    }

    fn render_draft(&mut self, ui: &mut Ui) -> Option<Holding> {
        ui.horizontal(|ui| {
            ui.add(
                TextEdit::singleline(&mut self.draft.symbol)
                    .hint_text("Symbol")
                    .desired_width(60.0),
            );
            ui.add(
                TextEdit::singleline(&mut self.draft.quantity)
                    .hint_text("Qty")
                    .desired_width(40.0),
            );
            ui.add(
                TextEdit::singleline(&mut self.draft.cost_basis)
                    .hint_text("Cost")
                    .desired_width(50.0),
            );
        });
        if !ui.button(UI_TEXT.add_holding_button).clicked() {
            return None;
        }
        let holding = self.draft.parse();
        if holding.is_some() {
            *self.draft = HoldingDraft::default();
        }
        holding
    }
}

impl Panel for PortfolioPanel<'_> {
    type Event = PortfolioEvent;

    fn render(&mut self, ui: &mut Ui) -> Vec<PortfolioEvent> {
        let mut events = Vec::new();
        spaced_separator(ui);
        ui.label(colored_subsection_heading(UI_TEXT.portfolio_heading));

        if let Some(index) = self.render_positions(ui) {
            events.push(PortfolioEvent::Remove(index));
        }
        if !self.valuation.positions.is_empty() {
            self.render_totals(ui);
        }
        ui.add_space(4.0);
        if let Some(holding) = self.render_draft(ui) {
            events.push(PortfolioEvent::Add(holding));
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(symbol: &str, quantity: &str, cost: &str) -> HoldingDraft {
        HoldingDraft {
            symbol: symbol.to_string(),
            quantity: quantity.to_string(),
            cost_basis: cost.to_string(),
        }
    }

    #[test]
    fn holding_draft_normalizes_symbol() {
        let holding = draft(" btcusdt ", "0.5", "30000").parse().unwrap();
        assert_eq!(holding.symbol, "BTCUSDT");
        assert_eq!(holding.quantity, 0.5);
        assert_eq!(holding.cost_basis, 30000.0);
    }

    #[test]
    fn holding_draft_rejects_bad_numbers() {
        assert!(draft("ETHUSDT", "0", "10").parse().is_none());
        assert!(draft("ETHUSDT", "abc", "10").parse().is_none());
        assert!(draft("ETHUSDT", "1", "-3").parse().is_none());
        assert!(draft("", "1", "3").parse().is_none());
    }
}
