use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::args::{
    DEFAULT_DURATION, DEFAULT_REQUEST_TIMEOUT, HttpMethod, LoadArgs, PositiveUsize,
};
use crate::error::{AppError, AppResult, HttpError, ValidationError};

/// When the worker pool stops issuing new requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationMode {
    /// Stop once this much wall-clock time has passed since the run started.
    Duration(Duration),
    /// Stop once this many outcomes have been counted.
    Iterations(u64),
}

/// Where request bodies come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadSpec {
    Empty,
    Static(String),
    Lines(PathBuf),
    Directory(PathBuf),
}

/// Immutable description of one load test run.
#[derive(Debug, Clone)]
pub struct LoadTestConfig {
    pub target_url: String,
    pub virtual_users: PositiveUsize,
    pub termination: TerminationMode,
    /// Configured run length. Iteration-bound runs keep the default here; it is
    /// the denominator for every reported rate.
    pub nominal_duration: Duration,
    pub method: HttpMethod,
    pub request_timeout: Duration,
    pub payload: PayloadSpec,
    pub log_level: Option<String>,
}

impl LoadTestConfig {
    /// Builds a duration-bound config with defaults for everything but the URL.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is empty or not an http(s) URL.
    pub fn new(target_url: &str) -> AppResult<Self> {
        let target_url = validate_url(Some(target_url))?;
        Ok(Self {
            target_url,
            virtual_users: PositiveUsize::try_from(1)?,
            termination: TerminationMode::Duration(DEFAULT_DURATION),
            nominal_duration: DEFAULT_DURATION,
            method: HttpMethod::Get,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            payload: PayloadSpec::Empty,
            log_level: None,
        })
    }

    /// Validates merged CLI/config arguments.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is missing or invalid, or more than one
    /// payload source is selected.
    pub fn from_args(args: &LoadArgs) -> AppResult<Self> {
        let target_url = validate_url(args.url.as_deref())?;

        let nominal_duration = args.duration.unwrap_or(DEFAULT_DURATION);
        let termination = args.iterations.map_or(
            TerminationMode::Duration(nominal_duration),
            |iterations| TerminationMode::Iterations(iterations.get()),
        );

        let payload = match (
            args.data.as_ref(),
            args.data_lines.as_ref(),
            args.payload_dir.as_ref(),
        ) {
            (None, None, None) => PayloadSpec::Empty,
            (Some(data), None, None) => PayloadSpec::Static(data.clone()),
            (None, Some(path), None) => PayloadSpec::Lines(PathBuf::from(path)),
            (None, None, Some(path)) => PayloadSpec::Directory(PathBuf::from(path)),
            (Some(_) | None, Some(_) | None, Some(_) | None) => {
                return Err(AppError::validation(
                    ValidationError::PayloadSourceConflict,
                ));
            }
        };

        Ok(Self {
            target_url,
            virtual_users: args.vus,
            termination,
            nominal_duration,
            method: args.method,
            request_timeout: args.request_timeout,
            payload,
            log_level: args.log_level.clone(),
        })
    }

    #[must_use]
    pub const fn rate_window(&self) -> Duration {
        self.nominal_duration
    }
}

fn validate_url(url: Option<&str>) -> AppResult<String> {
    let Some(url) = url.map(str::trim).filter(|url| !url.is_empty()) else {
        tracing::error!("Missing URL (set --url or provide in config).");
        return Err(AppError::validation(ValidationError::MissingUrl));
    };
    let parsed = Url::parse(url).map_err(|err| {
        AppError::http(HttpError::InvalidUrl {
            url: url.to_owned(),
            source: err,
        })
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(url.to_owned()),
        other => Err(AppError::http(HttpError::UnsupportedScheme {
            scheme: other.to_owned(),
        })),
    }
}
