//! Absentee Charts Main Application
//! Main window with control panel and chart viewer.

use crate::gui::control_panel::StatusKind;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use absentee_charts::analysis::SeasonalSummary;
use absentee_charts::charts::StaticChartRenderer;
use absentee_charts::config::{AppConfig, ChartGeometry};
use absentee_charts::pipeline::{self, Analysis};
use absentee_charts::error::SOURCE_UNAVAILABLE_MESSAGE;
use absentee_charts::AnalysisError;
use egui::SidePanel;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// A load still running after this long is reported as failed.
const LOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// CSV loading result from background thread
enum LoadResult {
    Progress(String),
    Complete(Analysis),
    Error(AnalysisError),
}

/// Main application window.
pub struct AbsenteeApp {
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,
    geometry: ChartGeometry,
    export_dir: Option<PathBuf>,
    summary: Option<SeasonalSummary>,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
    load_started: Option<Instant>,
    load_timeout: Duration,
}

impl AbsenteeApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let input = config.input.clone();
        let mut app = Self::from_config(config);
        app.start_loading(input);
        app
    }

    fn from_config(config: AppConfig) -> Self {
        Self {
            control_panel: ControlPanel::new(),
            chart_viewer: ChartViewer::new(),
            geometry: config.geometry,
            export_dir: config.export_dir,
            summary: None,
            load_rx: None,
            is_loading: false,
            load_started: None,
            load_timeout: LOAD_TIMEOUT,
        }
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.start_loading(path);
        }
    }

    /// Read and aggregate `path` on a background thread.
    fn start_loading(&mut self, path: PathBuf) {
        if self.is_loading {
            return;
        }

        // Clear previous charts
        self.chart_viewer.clear();
        self.summary = None;
        self.control_panel.report = None;
        self.control_panel.export_enabled = false;
        self.control_panel.csv_path = Some(path.clone());
        self.control_panel
            .set_status(StatusKind::Info, "Loading CSV file...");
        self.control_panel.is_busy = true;
        self.is_loading = true;
        self.load_started = Some(Instant::now());

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let _ = tx.send(LoadResult::Progress(format!(
                "Reading {}...",
                path.display()
            )));

            let result = match pipeline::analyze_file(&path) {
                Ok(analysis) => LoadResult::Complete(analysis),
                Err(e) => LoadResult::Error(e),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for CSV loading results.
    ///
    /// Every load ends in exactly one terminal state: charts, an analysis
    /// error, or a load failure when the worker vanished or timed out.
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        loop {
            match rx.try_recv() {
                Ok(LoadResult::Progress(status)) => {
                    self.control_panel.set_status(StatusKind::Info, &status);
                }
                Ok(LoadResult::Complete(analysis)) => {
                    self.show_analysis(analysis);
                    return;
                }
                Ok(LoadResult::Error(err)) => {
                    self.show_error(err);
                    return;
                }
                Err(TryRecvError::Disconnected) => {
                    error!("CSV loader stopped without a result");
                    self.fail_loading();
                    return;
                }
                Err(TryRecvError::Empty) => break,
            }
        }

        let stalled = self
            .load_started
            .is_some_and(|started| started.elapsed() >= self.load_timeout);
        if stalled {
            warn!(timeout_secs = self.load_timeout.as_secs(), "CSV load timed out");
            self.fail_loading();
            return;
        }

        self.load_rx = Some(rx);
    }

    fn show_analysis(&mut self, analysis: Analysis) {
        let report = analysis.report;
        self.chart_viewer.set_summary(&analysis.summary);
        self.summary = Some(analysis.summary);
        self.control_panel.report = Some(report);
        self.control_panel.export_enabled = true;
        self.control_panel.set_status(
            StatusKind::Success,
            &format!(
                "Loaded {} rows ({} valid)",
                report.rows_read, report.valid_rows
            ),
        );
        self.finish_loading();
    }

    fn show_error(&mut self, err: AnalysisError) {
        error!(error = %err, "failed to build charts");
        if let AnalysisError::EmptyDataset { rows_read } = err {
            self.control_panel.report = Some(pipeline::LoadReport {
                rows_read,
                valid_rows: 0,
                skipped_rows: rows_read,
            });
        }
        self.control_panel
            .set_status(StatusKind::Error, err.status_message());
        self.finish_loading();
    }

    fn fail_loading(&mut self) {
        self.control_panel
            .set_status(StatusKind::Error, SOURCE_UNAVAILABLE_MESSAGE);
        self.finish_loading();
    }

    fn finish_loading(&mut self) {
        self.is_loading = false;
        self.load_started = None;
        self.control_panel.is_busy = false;
    }

    /// Handle PNG export - write both charts and reveal the folder
    fn handle_export_png(&mut self) {
        let Some(summary) = &self.summary else {
            self.control_panel
                .set_status(StatusKind::Error, "No charts to export");
            return;
        };

        let dir = match self.export_dir.clone().or_else(|| {
            rfd::FileDialog::new()
                .set_title("Export charts to folder")
                .pick_folder()
        }) {
            Some(dir) => dir,
            None => return, // User cancelled
        };

        match StaticChartRenderer::export_summary(summary, &self.geometry, &dir) {
            Ok(paths) => {
                self.control_panel.set_status(
                    StatusKind::Success,
                    &format!("Exported {} charts to {}", paths.len(), dir.display()),
                );
                Self::reveal(&dir);
            }
            Err(e) => {
                error!(error = %e, "chart export failed");
                self.control_panel
                    .set_status(StatusKind::Error, &format!("Export error: {}", e));
            }
        }
    }

    /// Open the export folder with the system file browser.
    fn reveal(dir: &Path) {
        match open::that(dir) {
            Ok(()) => info!(dir = %dir.display(), "opened export folder"),
            Err(e) => warn!(dir = %dir.display(), error = %e, "could not open export folder"),
        }
    }
}

impl eframe::App for AbsenteeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::Reload => {
                            if let Some(path) = self.control_panel.csv_path.clone() {
                                self.start_loading(path);
                            }
                        }
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            let placeholder = if self.is_loading {
                "Loading..."
            } else if self.control_panel.status_kind == StatusKind::Error {
                self.control_panel.status.as_str()
            } else {
                "No Data"
            };
            self.chart_viewer.show(ui, placeholder);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use absentee_charts::data::RawRow;
    use std::sync::mpsc::Sender;

    fn loading_app() -> (AbsenteeApp, Sender<LoadResult>) {
        let mut app = AbsenteeApp::from_config(AppConfig::default());
        let (tx, rx) = channel();
        app.load_rx = Some(rx);
        app.is_loading = true;
        app.load_started = Some(Instant::now());
        app.control_panel.is_busy = true;
        (app, tx)
    }

    fn analysis() -> Analysis {
        let rows: Vec<RawRow> = vec![[("Date", "2023-10-15"), ("Absent", "5")]
            .into_iter()
            .collect()];
        pipeline::analyze_rows(&rows).unwrap()
    }

    #[test]
    fn test_pending_load_keeps_waiting() {
        let (mut app, _tx) = loading_app();

        app.check_load_results();

        assert!(app.is_loading);
        assert!(app.load_rx.is_some());
    }

    #[test]
    fn test_dead_worker_ends_in_failure() {
        let (mut app, tx) = loading_app();
        drop(tx);

        app.check_load_results();

        assert!(!app.is_loading);
        assert!(!app.control_panel.is_busy);
        assert!(app.load_rx.is_none());
        assert_eq!(app.control_panel.status_kind, StatusKind::Error);
        assert_eq!(app.control_panel.status, SOURCE_UNAVAILABLE_MESSAGE);
    }

    #[test]
    fn test_stalled_load_ends_in_failure() {
        let (mut app, _tx) = loading_app();
        app.load_timeout = Duration::ZERO;

        app.check_load_results();

        assert!(!app.is_loading);
        assert_eq!(app.control_panel.status, SOURCE_UNAVAILABLE_MESSAGE);
    }

    #[test]
    fn test_result_before_disconnect_wins() {
        let (mut app, tx) = loading_app();
        tx.send(LoadResult::Complete(analysis())).unwrap();
        drop(tx);

        app.check_load_results();

        assert!(!app.is_loading);
        assert!(app.summary.is_some());
        assert_eq!(app.control_panel.status_kind, StatusKind::Success);
    }
}
