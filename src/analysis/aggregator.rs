//! Season Aggregator Module
//! Sums absences per season and per flu bucket.

use crate::analysis::season::{Bucket, FluBucket, SeasonBucket};
use crate::data::AttendanceRecord;
use crate::error::AnalysisError;
use rayon::prelude::*;
use tracing::debug;

/// Summed absences per bucket. Every bucket of `B` is always present.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult<B: Bucket> {
    totals: Vec<(B, f64)>,
}

impl<B: Bucket> Default for AggregateResult<B> {
    fn default() -> Self {
        Self {
            totals: B::ALL.iter().map(|&b| (b, 0.0)).collect(),
        }
    }
}

impl<B: Bucket> AggregateResult<B> {
    pub fn add(&mut self, bucket: B, value: f64) {
        self.totals[bucket.index()].1 += value;
    }

    pub fn get(&self, bucket: B) -> f64 {
        self.totals[bucket.index()].1
    }

    /// `(bucket, total)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (B, f64)> + '_ {
        self.totals.iter().copied()
    }

    /// Sum over all buckets.
    pub fn total(&self) -> f64 {
        self.totals.iter().map(|(_, v)| v).sum()
    }

    /// Element-wise sum of two partial results.
    pub fn merge(mut self, other: Self) -> Self {
        for (bucket, value) in other.iter() {
            self.add(bucket, value);
        }
        self
    }
}

/// Aggregates of one successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalSummary {
    pub by_season: AggregateResult<SeasonBucket>,
    pub by_flu: AggregateResult<FluBucket>,
    pub valid_records: usize,
}

/// Partial sums carried through the parallel fold.
#[derive(Default)]
struct Tally {
    by_season: AggregateResult<SeasonBucket>,
    by_flu: AggregateResult<FluBucket>,
    count: usize,
}

impl Tally {
    fn push(mut self, season: SeasonBucket, absent: f64) -> Self {
        self.by_season.add(season, absent);
        self.by_flu.add(season.flu_bucket(), absent);
        self.count += 1;
        self
    }

    fn merge(self, other: Self) -> Self {
        Self {
            by_season: self.by_season.merge(other.by_season),
            by_flu: self.by_flu.merge(other.by_flu),
            count: self.count + other.count,
        }
    }
}

/// Groups attendance records by season.
pub struct SeasonAggregator;

impl SeasonAggregator {
    /// Sum absences of every dated record; undated records are skipped.
    /// An empty input yields all-zero results.
    pub fn aggregate(
        records: &[AttendanceRecord],
    ) -> (AggregateResult<SeasonBucket>, AggregateResult<FluBucket>) {
        let tally = Self::tally(records);
        (tally.by_season, tally.by_flu)
    }

    /// Like [`aggregate`](Self::aggregate), but reports a run with no
    /// dated records as [`AnalysisError::EmptyDataset`].
    pub fn summarize(records: &[AttendanceRecord]) -> Result<SeasonalSummary, AnalysisError> {
        let tally = Self::tally(records);
        if tally.count == 0 {
            return Err(AnalysisError::EmptyDataset {
                rows_read: records.len(),
            });
        }

        debug!(
            valid = tally.count,
            total_absent = tally.by_season.total(),
            "aggregated absences"
        );

        Ok(SeasonalSummary {
            by_season: tally.by_season,
            by_flu: tally.by_flu,
            valid_records: tally.count,
        })
    }

    fn tally(records: &[AttendanceRecord]) -> Tally {
        records
            .par_iter()
            .filter_map(|r| r.date.map(|d| (SeasonBucket::of(d), r.absent)))
            .fold(Tally::default, |acc, (season, absent)| acc.push(season, absent))
            .reduce(Tally::default, Tally::merge)
    }
}
