//! Analysis module - season classification and absence aggregation

mod aggregator;
mod season;

pub use aggregator::{AggregateResult, SeasonAggregator, SeasonalSummary};
pub use season::{Bucket, FluBucket, SeasonBucket};
