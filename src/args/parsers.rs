use std::time::Duration;

use super::types::{PositiveU64, PositiveUsize};
use crate::config::parse_duration_value;
use crate::error::ValidationError;

pub(super) fn parse_positive_u64(s: &str) -> Result<PositiveU64, ValidationError> {
    s.parse::<PositiveU64>()
}

pub(super) fn parse_positive_usize(s: &str) -> Result<PositiveUsize, ValidationError> {
    s.parse::<PositiveUsize>()
}

pub(super) fn parse_duration_arg(s: &str) -> Result<Duration, ValidationError> {
    parse_duration_value(s)
}
