use std::time::Duration;

use serde::Deserialize;

use crate::args::HttpMethod;
use crate::error::ValidationError;

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    #[serde(alias = "virtual_users")]
    pub vus: Option<usize>,
    pub duration: Option<DurationValue>,
    pub iterations: Option<u64>,
    pub timeout: Option<DurationValue>,
    pub data: Option<String>,
    pub data_lines: Option<String>,
    pub payload_dir: Option<String>,
    pub log_level: Option<String>,
}

/// A duration given either as plain milliseconds or as a suffixed string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Millis(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Millis(ms) => {
                if *ms == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_millis(*ms))
                }
            }
            DurationValue::Text(text) => super::parse_duration_value(text),
        }
    }
}
