//! Season Classification Module
//! Fixed month-to-season table and the flu / non-flu split derived from it.

use chrono::{Datelike, NaiveDate};
use std::fmt;

/// A closed set of aggregation buckets with a fixed display order.
pub trait Bucket: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Every bucket, in display order.
    const ALL: &'static [Self];

    /// Position of this bucket within `ALL`.
    fn index(self) -> usize;

    /// Chart label.
    fn label(self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeasonBucket {
    Spring,
    Summer,
    Fall,
    Winter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FluBucket {
    FluSeason,
    NonFluSeason,
}

use SeasonBucket::{Fall, Spring, Summer, Winter};

/// Season for each month, January first.
const MONTH_TABLE: [SeasonBucket; 12] = [
    Winter, Winter, Spring, Spring, Spring, Summer, Summer, Summer, Fall, Fall, Fall, Winter,
];

impl SeasonBucket {
    /// Season of a 1-based month; `None` outside 1..=12.
    pub fn from_month(month: u32) -> Option<Self> {
        let idx = month.checked_sub(1)? as usize;
        MONTH_TABLE.get(idx).copied()
    }

    pub fn of(date: NaiveDate) -> Self {
        MONTH_TABLE[date.month0() as usize]
    }

    /// Months (1-based) belonging to this season.
    pub fn months(self) -> Vec<u32> {
        (1..=12u32)
            .filter(|&m| Self::from_month(m) == Some(self))
            .collect()
    }

    pub fn flu_bucket(self) -> FluBucket {
        match self {
            Fall | Winter => FluBucket::FluSeason,
            Spring | Summer => FluBucket::NonFluSeason,
        }
    }
}

impl Bucket for SeasonBucket {
    const ALL: &'static [Self] = &[Spring, Summer, Fall, Winter];

    fn index(self) -> usize {
        self as usize
    }

    fn label(self) -> &'static str {
        match self {
            Spring => "Spring",
            Summer => "Summer",
            Fall => "Fall",
            Winter => "Winter",
        }
    }
}

impl FluBucket {
    pub fn from_month(month: u32) -> Option<Self> {
        SeasonBucket::from_month(month).map(SeasonBucket::flu_bucket)
    }
}

impl Bucket for FluBucket {
    const ALL: &'static [Self] = &[FluBucket::FluSeason, FluBucket::NonFluSeason];

    fn index(self) -> usize {
        self as usize
    }

    fn label(self) -> &'static str {
        match self {
            FluBucket::FluSeason => "Flu Season",
            FluBucket::NonFluSeason => "Non-Flu Season",
        }
    }
}

impl fmt::Display for SeasonBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for FluBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
