use std::time::Duration;

use super::types::{ByteTotals, DurationStats, RequestOutcome, SummaryStatistics};

/// Turns the joined outcome list into [`SummaryStatistics`].
///
/// Rates divide by the configured run length (`rate_window`), not by the time
/// the run actually took, so an iteration-bound run that finishes early
/// reports a lower rate than it achieved.
#[derive(Debug, Clone, Copy)]
pub struct StatsAggregator {
    rate_window: Duration,
}

impl StatsAggregator {
    #[must_use]
    pub const fn new(rate_window: Duration) -> Self {
        Self { rate_window }
    }

    #[must_use]
    pub fn summarize(&self, outcomes: &[RequestOutcome]) -> SummaryStatistics {
        let http_reqs = u64::try_from(outcomes.len()).unwrap_or(u64::MAX);
        let failed = outcomes.iter().filter(|outcome| outcome.is_failure()).count();
        let http_req_failed = u64::try_from(failed).unwrap_or(u64::MAX);
        let failed_ratio = if http_reqs == 0 {
            0.0
        } else {
            http_req_failed as f64 / http_reqs as f64
        };

        let mut durations: Vec<f64> = outcomes.iter().map(|outcome| outcome.duration_ms).collect();
        let http_req_duration = DurationStats::from_samples(&mut durations);

        let (sent, received) = outcomes.iter().fold((0u64, 0u64), |(sent, received), outcome| {
            (
                sent.saturating_add(outcome.bytes_sent),
                received.saturating_add(outcome.bytes_received),
            )
        });
        let window_secs = self.rate_window.as_secs_f64();

        SummaryStatistics {
            http_req_duration,
            http_req_failed,
            failed_ratio,
            http_reqs,
            http_reqs_rate: per_second(http_reqs, window_secs),
            data_sent: ByteTotals {
                total: sent,
                rate_per_sec: per_second(sent, window_secs),
            },
            data_received: ByteTotals {
                total: received,
                rate_per_sec: per_second(received, window_secs),
            },
            rate_window_ms: u64::try_from(self.rate_window.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl DurationStats {
    /// Sorts `samples` in place and reads nearest-rank statistics from it:
    /// median at `len / 2` (the upper middle for even lengths), p90 at
    /// `floor(len * 0.9)`, p95 at `floor(len * 0.95)`.
    pub(crate) fn from_samples(samples: &mut [f64]) -> Option<Self> {
        samples.sort_by(f64::total_cmp);
        let len = samples.len();
        let min = *samples.first()?;
        let max = *samples.last()?;
        let sum: f64 = samples.iter().sum();

        Some(Self {
            avg: sum / len as f64,
            min,
            med: *samples.get(len / 2)?,
            max,
            p90: *samples.get(len.saturating_mul(9) / 10)?,
            p95: *samples.get(len.saturating_mul(19) / 20)?,
        })
    }
}

fn per_second(total: u64, window_secs: f64) -> f64 {
    if window_secs > 0.0 {
        total as f64 / window_secs
    } else {
        0.0
    }
}
