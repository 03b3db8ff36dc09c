//! Absentee Charts - seasonal absence charts viewer
//!
//! Opens a window with both charts, or with `--export` writes them as PNG
//! files and exits.

mod gui;

use absentee_charts::charts::StaticChartRenderer;
use absentee_charts::config::AppConfig;
use absentee_charts::pipeline;
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;
use gui::AbsenteeApp;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "absentee_charts")]
#[command(about = "Chart school absences by season and flu season", long_about = None)]
struct Cli {
    /// Attendance CSV file
    #[arg(value_name = "CSV")]
    csv: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write both charts as PNG files into DIR and exit without a window
    #[arg(short, long, value_name = "DIR")]
    export: Option<PathBuf>,

    /// Chart width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Chart height in pixels
    #[arg(long)]
    height: Option<u32>,
}

impl Cli {
    /// Defaults, then the config file, then flags.
    fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_json_file(path)?,
            None => AppConfig::default(),
        };

        if let Some(csv) = &self.csv {
            config.input = csv.clone();
        }
        if let Some(dir) = &self.export {
            config.export_dir = Some(dir.clone());
        }
        if let Some(width) = self.width {
            config.geometry.width = width;
        }
        if let Some(height) = self.height {
            config.geometry.height = height;
        }
        config.geometry.validate()?;

        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let config = cli.resolve_config().context("invalid configuration")?;

    match &cli.export {
        Some(dir) => run_headless(&config, dir),
        None => run_viewer(config),
    }
}

/// Load, aggregate and export without opening a window.
fn run_headless(config: &AppConfig, dir: &Path) -> Result<()> {
    let analysis = match pipeline::analyze_file(&config.input) {
        Ok(analysis) => analysis,
        Err(err) => {
            error!(error = %err, "analysis failed");
            let message = err.status_message();
            return Err(anyhow::Error::new(err).context(message));
        }
    };

    let written = StaticChartRenderer::export_summary(&analysis.summary, &config.geometry, dir)
        .with_context(|| format!("failed to export charts to {}", dir.display()))?;

    info!(
        charts = written.len(),
        valid_rows = analysis.report.valid_rows,
        skipped_rows = analysis.report.skipped_rows,
        "export complete"
    );
    Ok(())
}

fn run_viewer(config: AppConfig) -> Result<()> {
    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 820.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("Absentee Charts"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Absentee Charts",
        options,
        Box::new(|cc| Ok(Box::new(AbsenteeApp::new(cc, config)))),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}
