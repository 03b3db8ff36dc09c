//! Row Normalizer Module
//! Turns loosely-typed CSV rows into canonical attendance records.
//!
//! Nothing here fails: unreadable dates become `None` and unreadable
//! counts become `0.0`, so one bad cell never aborts a load.

use crate::data::record::{AttendanceRecord, Field, RawRow};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Strict ISO calendar date.
const YMD_FORMAT: &str = "%Y-%m-%d";

/// Date-time layouts tried by the free-form fallback.
const GENERIC_DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
];

/// Date-only layouts tried by the free-form fallback.
/// `%B` and `%A` accept both full and abbreviated month/weekday names.
const GENERIC_DATE_FORMATS: [&str; 9] = [
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%m-%d-%Y",
    "%Y.%m.%d",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
    "%A, %d %B %Y",
    "%A %B %d %Y",
];

/// Normalizes raw rows field by field.
pub struct RowNormalizer;

impl RowNormalizer {
    /// Build a record from a raw row; total for any input.
    pub fn normalize(row: &RawRow) -> AttendanceRecord {
        AttendanceRecord {
            school_dbn: row.lookup(Field::SchoolDbn).unwrap_or_default().to_string(),
            date: Self::parse_date(row.lookup(Field::Date)),
            enrolled: Self::parse_count(row.lookup(Field::Enrolled)),
            absent: Self::parse_count(row.lookup(Field::Absent)),
            present: Self::parse_count(row.lookup(Field::Present)),
        }
    }

    /// Parse a date cell, trying in order: `YYYY-MM-DD`, `YYYYMMDD`,
    /// then the free-form layouts. The first layout that matches wins.
    pub fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
        let s = raw?.trim();
        if s.is_empty() {
            return None;
        }

        Self::parse_ymd(s)
            .or_else(|| Self::parse_compact(s))
            .or_else(|| Self::parse_generic(s))
    }

    /// Strict `YYYY-MM-DD`.
    pub fn parse_ymd(s: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(s, YMD_FORMAT).ok()
    }

    /// Strict `YYYYMMDD`: exactly eight ASCII digits forming a real date.
    pub fn parse_compact(s: &str) -> Option<NaiveDate> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let year: i32 = s[0..4].parse().ok()?;
        let month: u32 = s[4..6].parse().ok()?;
        let day: u32 = s[6..8].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }

    /// Free-form fallback. Zoned timestamps keep the calendar date as
    /// written rather than shifting it to another zone.
    pub fn parse_generic(s: &str) -> Option<NaiveDate> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.date_naive());
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Some(dt.date_naive());
        }

        GENERIC_DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(|dt| dt.date())
            .or_else(|| {
                GENERIC_DATE_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
            })
    }

    /// Coerce a count cell to a finite number, `0.0` otherwise.
    /// Negative values pass through unchanged.
    pub fn parse_count(raw: Option<&str>) -> f64 {
        let Some(s) = raw.map(str::trim) else {
            return 0.0;
        };
        if s.is_empty() {
            return 0.0;
        }

        match s.parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(RowNormalizer::parse_date(Some("2023-10-15")), ymd(2023, 10, 15));
    }

    #[test]
    fn test_parse_compact_date() {
        assert_eq!(RowNormalizer::parse_date(Some("20231115")), ymd(2023, 11, 15));
    }

    #[test]
    fn test_strict_formats_take_priority() {
        for s in ["2023-01-02", "2023-12-31", "20230102"] {
            let strict = RowNormalizer::parse_ymd(s).or_else(|| RowNormalizer::parse_compact(s));
            assert!(strict.is_some(), "{}", s);
            assert_eq!(RowNormalizer::parse_date(Some(s)), strict, "{}", s);
        }
    }

    #[test]
    fn test_generic_fallbacks() {
        let cases = [
            ("10/15/2023", ymd(2023, 10, 15)),
            ("2023/10/15", ymd(2023, 10, 15)),
            ("October 15, 2023", ymd(2023, 10, 15)),
            ("Oct 15 2023", ymd(2023, 10, 15)),
            ("15 Oct 2023", ymd(2023, 10, 15)),
            ("15 October 2023", ymd(2023, 10, 15)),
            ("October 15 2023", ymd(2023, 10, 15)),
            ("Sunday Oct 15 2023", ymd(2023, 10, 15)),
            ("Sunday, 15 October 2023", ymd(2023, 10, 15)),
            ("2023-10-15T08:30:00Z", ymd(2023, 10, 15)),
            ("2023-10-15T23:30:00-05:00", ymd(2023, 10, 15)),
            ("2023-10-15 08:30:00", ymd(2023, 10, 15)),
            ("Sun, 15 Oct 2023 08:30:00 +0000", ymd(2023, 10, 15)),
        ];
        for (input, expected) in cases {
            assert_eq!(RowNormalizer::parse_date(Some(input)), expected, "{}", input);
        }
    }

    #[test]
    fn test_unparseable_dates_are_none() {
        for s in ["", "   ", "not a date", "2023-02-30", "20231345", "2023-13-01"] {
            assert_eq!(RowNormalizer::parse_date(Some(s)), None, "{:?}", s);
        }
        assert_eq!(RowNormalizer::parse_date(None), None);
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert_eq!(RowNormalizer::parse_date(Some(" 2023-06-01 ")), ymd(2023, 6, 1));
        assert_eq!(RowNormalizer::parse_count(Some(" 12 ")), 12.0);
    }

    #[test]
    fn test_parse_count_defaults_to_zero() {
        assert_eq!(RowNormalizer::parse_count(Some("abc")), 0.0);
        assert_eq!(RowNormalizer::parse_count(Some("")), 0.0);
        assert_eq!(RowNormalizer::parse_count(Some("1,234")), 0.0);
        assert_eq!(RowNormalizer::parse_count(Some("inf")), 0.0);
        assert_eq!(RowNormalizer::parse_count(Some("NaN")), 0.0);
        assert_eq!(RowNormalizer::parse_count(None), 0.0);
    }

    #[test]
    fn test_parse_count_keeps_negatives_and_fractions() {
        assert_eq!(RowNormalizer::parse_count(Some("-3")), -3.0);
        assert_eq!(RowNormalizer::parse_count(Some("2.5")), 2.5);
        assert_eq!(RowNormalizer::parse_count(Some("1e3")), 1000.0);
    }

    #[test]
    fn test_normalize_full_row() {
        let record = RowNormalizer::normalize(&row(&[
            ("School DBN", "01M015"),
            ("Date", "20231115"),
            ("Enrolled", "172"),
            ("Absent", "19"),
            ("Present", "153"),
            ("Released", "0"),
        ]));

        assert_eq!(record.school_dbn, "01M015");
        assert_eq!(record.date, ymd(2023, 11, 15));
        assert_eq!(record.enrolled, 172.0);
        assert_eq!(record.absent, 19.0);
        assert_eq!(record.present, 153.0);
    }

    #[test]
    fn test_normalize_lowercase_headers() {
        let record = RowNormalizer::normalize(&row(&[
            ("schoolDBN", "02M047"),
            ("date", "2023-06-01"),
            ("absent", "2"),
        ]));

        assert_eq!(record.school_dbn, "02M047");
        assert_eq!(record.date, ymd(2023, 6, 1));
        assert_eq!(record.absent, 2.0);
        assert_eq!(record.enrolled, 0.0);
    }

    #[test]
    fn test_normalize_empty_row_uses_defaults() {
        let record = RowNormalizer::normalize(&RawRow::new());

        assert_eq!(record.school_dbn, "");
        assert_eq!(record.date, None);
        assert!(!record.is_valid());
        assert_eq!(record.absent, 0.0);
    }

    #[test]
    fn test_non_numeric_absent_keeps_record_valid() {
        let record = RowNormalizer::normalize(&row(&[("Date", "2023-10-15"), ("Absent", "abc")]));
        assert!(record.is_valid());
        assert_eq!(record.absent, 0.0);
    }
}
