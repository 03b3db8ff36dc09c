//! Absentee Charts - seasonal absence charts from daily attendance CSV files.
//!
//! Rows are normalized with tolerant header and date handling, absences are
//! summed per season and per flu / non-flu period, and the two totals are
//! drawn as bar charts.

pub mod analysis;
pub mod charts;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;

pub use error::AnalysisError;
