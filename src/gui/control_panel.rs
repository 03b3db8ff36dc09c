//! Control Panel Widget
//! Left side panel with the data source, export action and status area.

use absentee_charts::pipeline::LoadReport;
use egui::{Color32, RichText};
use std::path::PathBuf;

/// Severity of the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// Left side control panel with file selection and export controls.
pub struct ControlPanel {
    pub csv_path: Option<PathBuf>,
    pub report: Option<LoadReport>,
    pub status: String,
    pub status_kind: StatusKind,
    pub is_busy: bool,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            csv_path: None,
            report: None,
            status: "Ready".to_string(),
            status_kind: StatusKind::Info,
            is_busy: false,
            export_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set status line
    pub fn set_status(&mut self, kind: StatusKind, status: &str) {
        self.status_kind = kind;
        self.status = status.to_string();
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("📊 Absentee Charts")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Seasonal absence summary")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== CSV File Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.csv_path.is_some() {
                            ui.visuals().text_color()
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.add_enabled_ui(!self.is_busy, |ui| {
                            if ui.button("📂 Browse").clicked() {
                                action = ControlPanelAction::BrowseCsv;
                            }
                            if self.csv_path.is_some() && ui.button("⟳").clicked() {
                                action = ControlPanelAction::Reload;
                            }
                        });
                    });
                });
            });

        // ===== Row Counts =====
        if let Some(report) = &self.report {
            ui.add_space(10.0);
            egui::Grid::new("load_report")
                .num_columns(2)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    ui.label("Rows read:");
                    ui.label(report.rows_read.to_string());
                    ui.end_row();
                    ui.label("Valid rows:");
                    ui.label(report.valid_rows.to_string());
                    ui.end_row();
                    ui.label("Skipped (bad date):");
                    ui.label(report.skipped_rows.to_string());
                    ui.end_row();
                });
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled && !self.is_busy, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export PNG").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.label(RichText::new("ℹ Status").size(14.0).strong());
        ui.add_space(5.0);

        ui.horizontal_wrapped(|ui| {
            if self.is_busy {
                ui.spinner();
            }
            let status_color = match self.status_kind {
                StatusKind::Error => Color32::from_rgb(220, 53, 69),
                StatusKind::Success => Color32::from_rgb(40, 167, 69),
                StatusKind::Info => Color32::GRAY,
            };
            ui.label(RichText::new(&self.status).size(12.0).color(status_color));
        });

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    Reload,
    ExportPng,
}
