//! Request outcomes and the post-run statistics computed from them.
mod aggregate;
mod types;


pub use aggregate::StatsAggregator;
pub use types::{
    ByteTotals, DurationStats, OutcomeStatus, RequestOutcome, SummaryStatistics,
    UPSTREAM_UNAVAILABLE_STATUS,
};
