//! Application configuration.
//!
//! Values come from built-in defaults, then an optional JSON file, then
//! command-line overrides applied by the binary.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_INPUT: &str = "Daily Attendance Trends.csv";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Chart area is empty: {width}x{height} with the configured margins")]
    EmptyPlotArea { width: u32, height: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Margin {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 64,
            right: 32,
            bottom: 56,
            left: 96,
        }
    }
}

/// Pixel geometry shared by both charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChartGeometry {
    pub width: u32,
    pub height: u32,
    pub margin: Margin,
}

impl Default for ChartGeometry {
    fn default() -> Self {
        Self {
            width: 600,
            height: 340,
            margin: Margin::default(),
        }
    }
}

impl ChartGeometry {
    pub fn plot_width(&self) -> u32 {
        self.width
            .saturating_sub(self.margin.left.saturating_add(self.margin.right))
    }

    pub fn plot_height(&self) -> u32 {
        self.height
            .saturating_sub(self.margin.top.saturating_add(self.margin.bottom))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plot_width() == 0 || self.plot_height() == 0 {
            return Err(ConfigError::EmptyPlotArea {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub input: PathBuf,
    pub export_dir: Option<PathBuf>,
    pub geometry: ChartGeometry,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            export_dir: None,
            geometry: ChartGeometry::default(),
        }
    }
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.geometry.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}
