//! Run-level failures shown in the status area.

use crate::data::LoaderError;
use std::path::PathBuf;
use thiserror::Error;

pub const SOURCE_UNAVAILABLE_MESSAGE: &str =
    "Failed to load CSV. Check the CSV filename/path and that the file is readable.";
pub const EMPTY_DATASET_MESSAGE: &str =
    "No valid data found. Verify CSV filename, headers, and date format.";

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to load {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: LoaderError,
    },
    #[error("No valid rows after parsing ({rows_read} rows read)")]
    EmptyDataset { rows_read: usize },
}

impl AnalysisError {
    /// User-facing status text with guidance.
    pub fn status_message(&self) -> &'static str {
        match self {
            AnalysisError::SourceUnavailable { .. } => SOURCE_UNAVAILABLE_MESSAGE,
            AnalysisError::EmptyDataset { .. } => EMPTY_DATASET_MESSAGE,
        }
    }
}
