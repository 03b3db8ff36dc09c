//! Load, normalize, aggregate.

use crate::analysis::{SeasonAggregator, SeasonalSummary};
use crate::data::{AttendanceRecord, DataLoader, RawRow, RowNormalizer};
use crate::error::AnalysisError;
use rayon::prelude::*;
use std::path::Path;
use tracing::{info, warn};

/// Row counts from one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub rows_read: usize,
    pub valid_rows: usize,
    pub skipped_rows: usize,
}

impl LoadReport {
    pub fn from_records(records: &[AttendanceRecord]) -> Self {
        let valid_rows = records.iter().filter(|r| r.is_valid()).count();
        Self {
            rows_read: records.len(),
            valid_rows,
            skipped_rows: records.len() - valid_rows,
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub summary: SeasonalSummary,
    pub report: LoadReport,
}

pub fn normalize_rows(rows: &[RawRow]) -> Vec<AttendanceRecord> {
    rows.par_iter().map(RowNormalizer::normalize).collect()
}

/// Normalize and aggregate rows that are already in memory.
pub fn analyze_rows(rows: &[RawRow]) -> Result<Analysis, AnalysisError> {
    let records = normalize_rows(rows);
    let report = LoadReport::from_records(&records);

    if report.skipped_rows > 0 {
        warn!(
            skipped = report.skipped_rows,
            rows = report.rows_read,
            "rows without a usable date were skipped"
        );
    }

    let summary = SeasonAggregator::summarize(&records)?;
    Ok(Analysis { summary, report })
}

/// Read the CSV at `path` and aggregate it.
pub fn analyze_file(path: &Path) -> Result<Analysis, AnalysisError> {
    let rows = DataLoader::read_rows(path).map_err(|source| AnalysisError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let analysis = analyze_rows(&rows)?;
    info!(
        path = %path.display(),
        rows = analysis.report.rows_read,
        valid = analysis.report.valid_rows,
        "attendance data analyzed"
    );
    Ok(analysis)
}
