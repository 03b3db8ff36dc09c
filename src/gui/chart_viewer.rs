//! Chart Viewer Widget
//! Central scrollable panel showing the season and flu-season charts.

use absentee_charts::analysis::SeasonalSummary;
use absentee_charts::charts::{BarSeries, ChartPlotter, HoverTooltip, FLU_COLOR, SEASON_COLOR};
use egui::{Color32, RichText, ScrollArea};

/// Chart card configuration
const CHART_SPACING: f32 = 15.0;
const CHART_HEIGHT: f32 = 300.0;
const CHART_WIDTH: f32 = 640.0;

/// Displays both charts; owns the hover tooltip they share.
#[derive(Default)]
pub struct ChartViewer {
    charts: Vec<(BarSeries, Color32)>,
    tooltip: HoverTooltip,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.charts.clear();
    }

    pub fn set_summary(&mut self, summary: &SeasonalSummary) {
        let [seasons, flu] = BarSeries::for_summary(summary);
        self.charts = vec![(seasons, SEASON_COLOR), (flu, FLU_COLOR)];
    }

    /// Draw the charts, or `placeholder` when there is nothing to show.
    pub fn show(&self, ui: &mut egui::Ui, placeholder: &str) {
        if self.charts.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new(placeholder).size(20.0));
            });
            return;
        }

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (series, color) in &self.charts {
                    egui::Frame::none()
                        .rounding(8.0)
                        .stroke(egui::Stroke::new(1.0, color.gamma_multiply(0.6)))
                        .fill(ui.visuals().widgets.noninteractive.bg_fill)
                        .inner_margin(12.0)
                        .show(ui, |ui| {
                            ui.set_width(CHART_WIDTH);
                            ChartPlotter::draw_bar_chart(
                                ui,
                                series,
                                *color,
                                &self.tooltip,
                                CHART_HEIGHT,
                            );
                        });
                    ui.add_space(CHART_SPACING);
                }
            });
    }
}
