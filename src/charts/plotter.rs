//! Chart Plotter Module
//! Draws interactive bar charts using egui_plot.

use crate::charts::series::{format_count, BarEntry, BarSeries};
use egui::{Align2, Color32, RichText};
use egui_plot::{Bar, BarChart, GridMark, Plot, PlotPoint, Text};

pub const SEASON_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue
pub const FLU_COLOR: Color32 = Color32::from_rgb(231, 76, 60); // Red

/// Hover tooltip shared by the charts of one viewer.
///
/// The owner passes it into every draw call; charts never create their own.
#[derive(Debug, Clone)]
pub struct HoverTooltip {
    pub fill: Color32,
    pub text_color: Color32,
    pub rounding: f32,
    pub inner_margin: f32,
    pub font_size: f32,
}

impl Default for HoverTooltip {
    fn default() -> Self {
        Self {
            fill: Color32::from_rgba_unmultiplied(15, 23, 42, 235),
            text_color: Color32::WHITE,
            rounding: 10.0,
            inner_margin: 8.0,
            font_size: 12.0,
        }
    }
}

impl HoverTooltip {
    /// Heading and body lines for a bar.
    pub fn lines(bar: &BarEntry) -> (String, String) {
        (
            bar.label.clone(),
            format!("Absences: {}", format_count(bar.value)),
        )
    }

    pub fn show(&self, ui: &mut egui::Ui, bar: &BarEntry) {
        let (heading, body) = Self::lines(bar);
        egui::Frame::none()
            .fill(self.fill)
            .rounding(self.rounding)
            .inner_margin(self.inner_margin)
            .show(ui, |ui| {
                ui.label(
                    RichText::new(heading)
                        .strong()
                        .size(self.font_size)
                        .color(self.text_color),
                );
                ui.label(
                    RichText::new(body)
                        .size(self.font_size)
                        .color(self.text_color),
                );
            });
    }
}

/// Creates bar charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw one bar chart: title, category axis in series order, value axis
    /// from zero with headroom, value labels above bars and a hover tooltip.
    pub fn draw_bar_chart(
        ui: &mut egui::Ui,
        series: &BarSeries,
        color: Color32,
        tooltip: &HoverTooltip,
        height: f32,
    ) {
        ui.label(RichText::new(&series.title).size(15.0).strong());

        let axis = series.value_axis();
        let n = series.bars.len();
        let x_labels: Vec<String> = series.bars.iter().map(|b| b.label.clone()).collect();
        let ticks = axis.ticks();
        let step = axis.step;

        let bars: Vec<Bar> = series
            .bars
            .iter()
            .enumerate()
            .map(|(i, b)| {
                Bar::new(i as f64, b.value)
                    .width(series.bar_width())
                    .name(&b.label)
                    .fill(color.gamma_multiply(0.85))
                    .stroke(egui::Stroke::new(1.0, color))
            })
            .collect();

        let plot_response = Plot::new(format!("bar_chart_{}", series.title))
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .allow_double_click_reset(false)
            .show_x(false)
            .show_y(false)
            .show_grid([false, true])
            .include_x(-0.5)
            .include_x(n as f64 - 0.5)
            .include_y(0.0)
            .include_y(axis.max)
            .y_axis_label("Absences")
            .x_grid_spacer(move |_input| {
                (0..n)
                    .map(|i| GridMark {
                        value: i as f64,
                        step_size: 1.0,
                    })
                    .collect()
            })
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (mark.value - idx).abs() < 1e-6 {
                    x_labels.get(idx as usize).cloned().unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .y_grid_spacer(move |_input| {
                ticks
                    .iter()
                    .map(|&value| GridMark {
                        value,
                        step_size: step,
                    })
                    .collect()
            })
            .y_axis_formatter(|mark, _range| {
                if mark.value < 0.0 {
                    String::new()
                } else {
                    format_count(mark.value)
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(color).allow_hover(false));

                for (i, b) in series.bars.iter().enumerate() {
                    plot_ui.text(
                        Text::new(
                            PlotPoint::new(i as f64, b.value.max(0.0)),
                            RichText::new(format_count(b.value)).size(12.0),
                        )
                        .anchor(Align2::CENTER_BOTTOM),
                    );
                }

                plot_ui
                    .pointer_coordinate()
                    .and_then(|p| series.bar_index_at(p.x, p.y))
            });

        if let Some(bar) = plot_response.inner.and_then(|i| series.bars.get(i)) {
            plot_response
                .response
                .on_hover_ui_at_pointer(|ui| tooltip.show(ui, bar));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tooltip_lines() {
        let bar = BarEntry {
            label: "Winter".to_string(),
            value: 12345.0,
        };
        let (heading, body) = HoverTooltip::lines(&bar);
        assert_eq!(heading, "Winter");
        assert_eq!(body, "Absences: 12,345");
    }
}
