//! Attendance Record Module
//! Raw CSV rows and the canonical attendance record they normalize into.

use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

/// Canonical fields recognized in an attendance CSV.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Date,
    SchoolDbn,
    Enrolled,
    Absent,
    Present,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Date,
        Field::SchoolDbn,
        Field::Enrolled,
        Field::Absent,
        Field::Present,
    ];

    /// Header spellings accepted for this field, in lookup order.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            Field::Date => &["Date", "date", "DATE"],
            Field::SchoolDbn => &["School DBN", "schoolDBN"],
            Field::Enrolled => &["Enrolled", "enrolled", "ENROLLED"],
            Field::Absent => &["Absent", "absent", "ABSENT"],
            Field::Present => &["Present", "present", "PRESENT"],
        }
    }
}

/// One CSV row as read from disk: header name -> cell text.
///
/// A key is present whenever the source row had that field, even if the
/// cell was empty. Only fields missing from a short row are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: HashMap<String, String>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.cells.get(key).map(String::as_str)
    }

    /// Value of the first candidate header present in this row. An empty
    /// value still wins over later candidates.
    pub fn lookup(&self, field: Field) -> Option<&str> {
        field.candidates().iter().find_map(|key| self.get(key))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RawRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (key, value) in iter {
            row.insert(key, value);
        }
        row
    }
}

/// A normalized daily attendance record.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceRecord {
    pub school_dbn: String,
    /// `None` when the source date was missing or unparseable.
    pub date: Option<NaiveDate>,
    pub enrolled: f64,
    pub absent: f64,
    pub present: f64,
}

impl AttendanceRecord {
    /// Whether this record takes part in aggregation.
    pub fn is_valid(&self) -> bool {
        self.date.is_some()
    }

    /// 1-based calendar month of the record date.
    pub fn month(&self) -> Option<u32> {
        self.date.map(|d| d.month())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_prefers_first_candidate() {
        let row: RawRow = [("date", "2023-01-10"), ("Date", "2023-10-15")]
            .into_iter()
            .collect();
        assert_eq!(row.lookup(Field::Date), Some("2023-10-15"));
    }

    #[test]
    fn test_lookup_stops_at_empty_first_candidate() {
        let row: RawRow = [("Date", ""), ("date", "2023-10-15")].into_iter().collect();
        assert_eq!(row.lookup(Field::Date), Some(""));
    }

    #[test]
    fn test_lookup_falls_through_to_later_candidates() {
        let row: RawRow = [("ABSENT", "7")].into_iter().collect();
        assert_eq!(row.lookup(Field::Absent), Some("7"));
        assert_eq!(row.lookup(Field::Present), None);
    }

    #[test]
    fn test_school_candidates_are_not_case_folded() {
        let row: RawRow = [("SCHOOL DBN", "01M015")].into_iter().collect();
        assert_eq!(row.lookup(Field::SchoolDbn), None);
    }

    #[test]
    fn test_every_field_has_candidates() {
        for field in Field::ALL {
            assert!(!field.candidates().is_empty(), "{:?}", field);
        }
    }

    #[test]
    fn test_record_month() {
        let record = AttendanceRecord {
            school_dbn: String::new(),
            date: NaiveDate::from_ymd_opt(2023, 11, 15),
            enrolled: 0.0,
            absent: 0.0,
            present: 0.0,
        };
        assert!(record.is_valid());
        assert_eq!(record.month(), Some(11));
    }
}
