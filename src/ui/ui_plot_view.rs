use eframe::egui::{self, Color32};
use egui_plot::{Bar, BarChart, Corner, HLine, Legend, Line, LineStyle, Plot, PlotPoints, Points};
use itertools::{Itertools, MinMaxResult};

use crate::config::ANALYSIS;
use crate::domain::PricePoint;
use crate::indicators::IndicatorSeries;
use crate::models::Analysis;
use crate::ui::config::UI_CONFIG;
use crate::utils::time_utils::epoch_ms_to_chart_label;

/// Pairs each defined indicator value with the timestamp of its candle.
pub fn aligned_points(history: &[PricePoint], series: &IndicatorSeries) -> Vec<[f64; 2]> {
    history
        .iter()
        .zip(series)
        .filter_map(|(point, value)| value.map(|v| [point.timestamp_ms as f64, v]))
        .collect()
}

/// Y range covering every price plus the forecast, padded so lines do not
/// touch the frame. `None` for an empty chart.
pub fn price_bounds(points: &[PricePoint], extra: Option<f64>) -> Option<(f64, f64)> {
    let (lo, hi) = match points
        .iter()
        .map(|p| p.price)
        .chain(extra)
        .filter(|p| p.is_finite())
        .minmax()
    {
        MinMaxResult::NoElements => return None,
        MinMaxResult::OneElement(p) => (p, p),
        MinMaxResult::MinMax(lo, hi) => (lo, hi),
    };
    let pad = ((hi - lo) * 0.05).max(hi.abs() * 0.001);
    Some((lo - pad, hi + pad))
}

/// Index-based points for a bare value series; non-finite values are skipped.
pub fn sparkline_points(values: &[f64]) -> Vec<[f64; 2]> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, &v)| [i as f64, v])
        .collect()
}

#[derive(Default)]
pub struct PlotView;

impl PlotView {
    pub fn new() -> Self {
        Self
    }

    /// Price chart: working series (history plus live ticks), EMA overlay,
    /// the next-candle forecast and a marker at the live price.
    pub fn show_price_plot(
        &self,
        ui: &mut egui::Ui,
        analysis: &Analysis,
        series: &[PricePoint],
        live_price: Option<f64>,
    ) {
        let points = if series.is_empty() {
            analysis.history.as_slice()
        } else {
            series
        };
        let forecast = analysis.forecast_price();
        let forecast_x = analysis
            .history
            .last()
            .map(|p| (p.timestamp_ms + analysis.interval.as_ms()) as f64);
        let bounds = price_bounds(points, forecast);

        let price_line: PlotPoints = points
            .iter()
            .map(|p| [p.timestamp_ms as f64, p.price])
            .collect();
        let ema_line = aligned_points(&analysis.history, &analysis.lines.ema);

        Plot::new("price_plot")
            .legend(Legend::default().position(Corner::LeftTop))
            .height(ui.available_height() * 0.6)
            .x_axis_formatter(|mark, _range| epoch_ms_to_chart_label(mark.value as i64))
            .label_formatter(|name, value| {
                let time = epoch_ms_to_chart_label(value.x as i64);
                if name.is_empty() {
                    format!("{}\n{:.4}", time, value.y)
                } else {
                    format!("{}\n{}: {:.4}", time, name, value.y)
                }
            })
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                if let Some((lo, hi)) = bounds {
                    plot_ui.set_plot_bounds_y(lo..=hi);
                }
                plot_ui.line(
                    Line::new(analysis.symbol.as_str(), price_line)
                        .color(UI_CONFIG.colors.price_line)
                        .width(1.5),
                );
                if !ema_line.is_empty() {
                    plot_ui.line(
                        Line::new(
                            format!("EMA {}", ANALYSIS.indicators.ema_period),
                            PlotPoints::from(ema_line),
                        )
                        .color(UI_CONFIG.colors.ema_line)
                        .width(1.0),
                    );
                }
                if let (Some(x), Some(y)) = (forecast_x, forecast) {
                    plot_ui.points(
                        Points::new("Forecast", vec![[x, y]])
                            .color(UI_CONFIG.colors.forecast)
                            .radius(4.0),
                    );
                }
                if let Some(price) = live_price {
                    plot_ui.hline(
                        HLine::new("Live", price)
                            .color(UI_CONFIG.colors.neutral)
                            .style(LineStyle::dashed_loose()),
                    );
                }
            });
    }

    /// RSI with the overbought/oversold guides.
    pub fn show_rsi_plot(&self, ui: &mut egui::Ui, analysis: &Analysis) {
        let rsi = aligned_points(&analysis.history, &analysis.lines.rsi);
        let narrative = &ANALYSIS.narrative;
        Plot::new("rsi_plot")
            .height(90.0)
            .show_x(false)
            .x_axis_formatter(|mark, _range| epoch_ms_to_chart_label(mark.value as i64))
            .allow_scroll(false)
            .allow_zoom(false)
            .show(ui, |plot_ui| {
                plot_ui.set_plot_bounds_y(0.0..=100.0);
                plot_ui.hline(
                    HLine::new("Overbought", narrative.rsi_overbought)
                        .color(UI_CONFIG.colors.bearish)
                        .style(LineStyle::dashed_dense()),
                );
                plot_ui.hline(
                    HLine::new("Oversold", narrative.rsi_oversold)
                        .color(UI_CONFIG.colors.bullish)
                        .style(LineStyle::dashed_dense()),
                );
                plot_ui.line(
                    Line::new("RSI", PlotPoints::from(rsi)).color(UI_CONFIG.colors.price_line),
                );
            });
    }

    /// Small axis-less line, for series without timestamps.
    pub fn show_sparkline(&self, ui: &mut egui::Ui, id: &str, values: &[f64]) {
        let points = sparkline_points(values);
        Plot::new(id)
            .height(50.0)
            .show_axes(false)
            .show_grid(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_zoom(false)
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new("", PlotPoints::from(points)).color(UI_CONFIG.colors.price_line),
                );
            });
    }

    /// MACD histogram bars, green above zero and red below.
    pub fn show_macd_plot(&self, ui: &mut egui::Ui, analysis: &Analysis) {
        let bar_width = analysis.interval.as_ms() as f64 * 0.8;
        let bars: Vec<Bar> = aligned_points(&analysis.history, &analysis.lines.macd_histogram)
            .into_iter()
            .map(|[x, y]| {
                let fill: Color32 = if y >= 0.0 {
                    UI_CONFIG.colors.bullish
                } else {
                    UI_CONFIG.colors.bearish
                };
                Bar::new(x, y).width(bar_width).fill(fill)
            })
            .collect();
        Plot::new("macd_plot")
            .height(90.0)
            .show_x(false)
            .x_axis_formatter(|mark, _range| epoch_ms_to_chart_label(mark.value as i64))
            .allow_scroll(false)
            .allow_zoom(false)
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new("MACD histogram", bars));
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(prices: &[f64]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &price)| PricePoint {
                timestamp_ms: i as i64 * 1000,
                price,
            })
            .collect()
    }

    #[test]
    fn aligned_points_skip_warm_up() {
        let h = history(&[1.0, 2.0, 3.0]);
        let series = vec![None, Some(1.5), Some(2.5)];
        assert_eq!(aligned_points(&h, &series), vec![[1000.0, 1.5], [2000.0, 2.5]]);
    }

    #[test]
    fn bounds_include_forecast() {
        let h = history(&[10.0, 12.0]);
        let (lo, hi) = price_bounds(&h, Some(20.0)).unwrap();
        assert!(lo < 10.0 && hi > 20.0);
        assert!(price_bounds(&[], None).is_none());
    }

    #[test]
    fn sparkline_skips_gaps_but_keeps_positions() {
        assert_eq!(
            sparkline_points(&[1.0, f64::NAN, 3.0]),
            vec![[0.0, 1.0], [2.0, 3.0]]
        );
    }

    #[test]
    fn flat_series_still_gets_a_range() {
        let h = history(&[5.0]);
        let (lo, hi) = price_bounds(&h, None).unwrap();
        assert!(lo < 5.0 && hi > 5.0);
    }
}
