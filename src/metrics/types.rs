use serde::{Serialize, Serializer};

/// Bad Gateway: the tested service's own upstream is not ready. Such responses
/// are retried without being recorded.
pub const UPSTREAM_UNAVAILABLE_STATUS: u16 = 502;

/// What a single request attempt ended with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// A response arrived with this HTTP status.
    Code(u16),
    /// The transport failed before a full response was read.
    Error,
    /// The per-request timeout expired.
    Timeout,
}

impl OutcomeStatus {
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, OutcomeStatus::Error | OutcomeStatus::Timeout)
    }

    #[must_use]
    pub const fn is_upstream_unavailable(self) -> bool {
        matches!(self, OutcomeStatus::Code(UPSTREAM_UNAVAILABLE_STATUS))
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeStatus::Code(code) => write!(f, "{}", code),
            OutcomeStatus::Error => f.write_str("error"),
            OutcomeStatus::Timeout => f.write_str("timeout"),
        }
    }
}

impl Serialize for OutcomeStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            OutcomeStatus::Code(code) => serializer.serialize_u16(*code),
            OutcomeStatus::Error => serializer.serialize_str("error"),
            OutcomeStatus::Timeout => serializer.serialize_str("timeout"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RequestOutcome {
    pub status: OutcomeStatus,
    pub duration_ms: f64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

impl RequestOutcome {
    #[must_use]
    pub const fn new(
        status: OutcomeStatus,
        duration_ms: f64,
        bytes_sent: u64,
        bytes_received: u64,
    ) -> Self {
        Self {
            status,
            duration_ms,
            bytes_sent,
            bytes_received,
        }
    }

    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.status.is_failure()
    }

    #[must_use]
    pub const fn is_upstream_unavailable(&self) -> bool {
        self.status.is_upstream_unavailable()
    }
}

/// Nearest-rank duration statistics in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DurationStats {
    pub avg: f64,
    pub min: f64,
    pub med: f64,
    pub max: f64,
    pub p90: f64,
    pub p95: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ByteTotals {
    pub total: u64,
    pub rate_per_sec: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStatistics {
    /// `None` when no outcome was recorded.
    pub http_req_duration: Option<DurationStats>,
    pub http_req_failed: u64,
    pub failed_ratio: f64,
    pub http_reqs: u64,
    pub http_reqs_rate: f64,
    pub data_sent: ByteTotals,
    pub data_received: ByteTotals,
    pub rate_window_ms: u64,
}
