//! CSV Data Loader Module
//! Reads attendance CSV files with Polars into raw, string-valued rows.

use crate::data::record::RawRow;
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
}

/// Handles CSV file loading with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file into raw rows.
    ///
    /// Every column is read as text so that values such as `20231115`
    /// reach the normalizer exactly as written. Reading is best-effort:
    /// empty cells stay as `""`, extra trailing fields are dropped, short
    /// rows leave their missing cells out and invalid UTF-8 is replaced.
    pub fn read_rows(path: &Path) -> Result<Vec<RawRow>, LoaderError> {
        let metadata = fs::metadata(path).map_err(|source| LoaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if metadata.len() == 0 {
            debug!(path = %path.display(), "CSV file is empty");
            return Ok(Vec::new());
        }

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .with_missing_is_null(false)
            .with_truncate_ragged_lines(true)
            .with_encoding(CsvEncoding::LossyUtf8)
            .finish()?
            .collect()?;

        debug!(
            path = %path.display(),
            rows = df.height(),
            columns = df.width(),
            "CSV loaded"
        );

        Self::rows_from_frame(&df)
    }

    /// Convert a DataFrame into raw rows keyed by header name.
    /// Null cells (fields a short row never had) are left out of the row.
    pub fn rows_from_frame(df: &DataFrame) -> Result<Vec<RawRow>, LoaderError> {
        let columns: Vec<(String, Series)> = df
            .get_columns()
            .iter()
            .map(|col| {
                let name = col.name().trim_start_matches('\u{feff}').to_string();
                let text = col.as_materialized_series().cast(&DataType::String)?;
                Ok((name, text))
            })
            .collect::<PolarsResult<_>>()?;

        let cells: Vec<(&str, &StringChunked)> = columns
            .iter()
            .map(|(name, series)| Ok((name.as_str(), series.str()?)))
            .collect::<PolarsResult<_>>()?;

        let rows = (0..df.height())
            .map(|i| {
                cells
                    .iter()
                    .filter_map(|(name, values)| values.get(i).map(|v| (*name, v)))
                    .collect::<RawRow>()
            })
            .collect();

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Field;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_rows_from_frame_skips_nulls() {
        let df = df! {
            "Date" => [Some("2023-10-15"), None],
            "Absent" => [Some("5"), Some("3")],
        }
        .unwrap();

        let rows = DataLoader::rows_from_frame(&df).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].lookup(Field::Date), Some("2023-10-15"));
        assert_eq!(rows[1].lookup(Field::Date), None);
        assert_eq!(rows[1].lookup(Field::Absent), Some("3"));
    }

    #[test]
    fn test_read_rows_keeps_text_verbatim() {
        let file = write_csv("School DBN,Date,Absent\n01M015,20231115,007\n");

        let rows = DataLoader::read_rows(file.path()).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("School DBN"), Some("01M015"));
        assert_eq!(rows[0].get("Date"), Some("20231115"));
        assert_eq!(rows[0].get("Absent"), Some("007"));
    }

    #[test]
    fn test_read_rows_keeps_empty_cells() {
        let file = write_csv("Date,date,Absent\n,2023-10-15,5\n");

        let rows = DataLoader::read_rows(file.path()).unwrap();

        assert_eq!(rows[0].get("Date"), Some(""));
        assert_eq!(rows[0].lookup(Field::Date), Some(""));
        assert_eq!(rows[0].lookup(Field::Absent), Some("5"));
    }

    #[test]
    fn test_read_rows_tolerates_ragged_lines() {
        let file = write_csv("Date,Absent\n2023-10-15,5\n2023-01-10,3,extra\n2023-06-01\n");

        let rows = DataLoader::read_rows(file.path()).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].get("Date"), Some("2023-01-10"));
        assert_eq!(rows[1].get("Absent"), Some("3"));
        assert_eq!(rows[2].get("Date"), Some("2023-06-01"));
        assert_eq!(rows[2].get("Absent").unwrap_or_default(), "");
    }

    #[test]
    fn test_read_rows_replaces_invalid_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"School DBN,Date,Absent\nP\xe9S,2023-10-15,5\n01M015,2023-06-01,2\n")
            .unwrap();
        file.flush().unwrap();

        let rows = DataLoader::read_rows(file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("School DBN"), Some("P\u{fffd}S"));
        assert_eq!(rows[0].get("Absent"), Some("5"));
        assert_eq!(rows[1].get("School DBN"), Some("01M015"));
    }

    #[test]
    fn test_read_rows_header_only() {
        let file = write_csv("Date,Absent\n");
        let rows = DataLoader::read_rows(file.path()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_read_rows_zero_byte_file() {
        let file = write_csv("");
        let rows = DataLoader::read_rows(file.path()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_read_rows_missing_file() {
        let err = DataLoader::read_rows(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoaderError::Io { .. }));
    }
}
