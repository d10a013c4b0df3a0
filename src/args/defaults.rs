use std::time::Duration;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("swarmload/", env!("CARGO_PKG_VERSION"));

/// Nominal run length when neither a duration nor an iteration budget is set.
/// Also the rate window for iteration-bound runs.
pub(crate) const DEFAULT_DURATION: Duration = Duration::from_millis(5_000);

pub(crate) const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
