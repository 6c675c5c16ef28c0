use eframe::egui::{Color32, Context, RichText, Ui, Visuals};

use crate::ui::config::UI_CONFIG;

/// Creates a colored heading with uppercase text and monospace font
pub fn colored_heading(text: impl Into<String>) -> RichText {
    RichText::new(text.into().to_uppercase())
        .color(UI_CONFIG.colors.heading)
        .monospace()
}

pub fn colored_subsection_heading(text: impl Into<String>) -> RichText {
    RichText::new(text.into()).color(UI_CONFIG.colors.subsection_heading)
}

/// Sets up custom visuals for the entire application
pub fn setup_custom_visuals(ctx: &Context) {
    let mut visuals = Visuals::dark();
    visuals.window_fill = UI_CONFIG.colors.central_panel;
    visuals.panel_fill = UI_CONFIG.colors.side_panel;
    visuals.widgets.noninteractive.fg_stroke.color = UI_CONFIG.colors.label;
    visuals.widgets.hovered.fg_stroke.color = UI_CONFIG.colors.heading;
    ctx.set_visuals(visuals);
}

/// Creates a section heading with standard spacing
pub fn section_heading(ui: &mut Ui, text: impl Into<String>) {
    ui.add_space(10.0);
    ui.heading(colored_heading(text));
    ui.add_space(5.0);
}

pub fn spaced_separator(ui: &mut Ui) {
    ui.add_space(8.0);
    ui.separator();
    ui.add_space(8.0);
}

/// Price with precision that follows magnitude: cents for large prices,
/// more decimals as the price shrinks.
pub fn format_price(price: f64) -> String {
    if !price.is_finite() {
        return "-".to_string();
    }
    let abs_price = price.abs();
    if abs_price >= 1000.0 {
        format!("${:.2}", price)
    } else if abs_price >= 1.0 {
        format!("${:.4}", price)
    } else if abs_price >= 0.01 {
        format!("${:.5}", price)
    } else {
        format!("${:.8}", price)
    }
}

pub fn format_optional(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.*}", decimals, v),
        _ => "-".to_string(),
    }
}

/// Green for gains, red for losses, gold for flat/unknown.
pub fn signed_color(value: Option<f64>) -> Color32 {
    match value {
        Some(v) if v > 0.0 => UI_CONFIG.colors.bullish,
        Some(v) if v < 0.0 => UI_CONFIG.colors.bearish,
        _ => UI_CONFIG.colors.neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_precision_follows_magnitude() {
        assert_eq!(format_price(43250.126), "$43250.13");
        assert_eq!(format_price(12.48291), "$12.4829");
        assert_eq!(format_price(0.123456), "$0.12346");
        assert_eq!(format_price(0.00000231), "$0.00000231");
        assert_eq!(format_price(f64::NAN), "-");
    }

    #[test]
    fn optional_values() {
        assert_eq!(format_optional(Some(70.1234), 2), "70.12");
        assert_eq!(format_optional(None, 2), "-");
        assert_eq!(signed_color(Some(-1.0)), UI_CONFIG.colors.bearish);
        assert_eq!(signed_color(None), UI_CONFIG.colors.neutral);
    }
}
