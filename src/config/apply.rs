use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{LoadArgs, PositiveU64, PositiveUsize};
use crate::error::ConfigError;

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments. Values given on the command
/// line (or through an env var) always win over the file.
///
/// # Errors
///
/// Returns an error when config values are invalid, or when the file sets both
/// `duration` and `iterations` and the command line sets neither.
pub fn apply_config(
    args: &mut LoadArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> Result<(), ConfigError> {
    if !is_explicit(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_explicit(matches, "method")
        && let Some(method) = config.method
    {
        args.method = method;
    }

    if !is_explicit(matches, "vus")
        && let Some(vus) = config.vus
    {
        args.vus = PositiveUsize::try_from(vus)
            .map_err(|err| ConfigError::InvalidField {
                field: "vus",
                source: err,
            })?;
    }

    // Termination comes from one source only: a CLI budget hides the file's.
    if args.duration.is_none() && args.iterations.is_none() {
        if config.duration.is_some() && config.iterations.is_some() {
            return Err(ConfigError::Conflict {
                left: "duration",
                right: "iterations",
            });
        }
        if let Some(duration) = config.duration.as_ref() {
            args.duration = Some(duration.to_duration().map_err(|err| {
                ConfigError::InvalidField {
                    field: "duration",
                    source: err,
                }
            })?);
        }
        if let Some(iterations) = config.iterations {
            args.iterations = Some(PositiveU64::try_from(iterations).map_err(|err| {
                ConfigError::InvalidField {
                    field: "iterations",
                    source: err,
                }
            })?);
        }
    }

    if !is_explicit(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = timeout.to_duration().map_err(|err| ConfigError::InvalidField {
            field: "timeout",
            source: err,
        })?;
    }

    let cli_payload = args.data.is_some() || args.data_lines.is_some() || args.payload_dir.is_some();
    if !cli_payload {
        args.data.clone_from(&config.data);
        args.data_lines.clone_from(&config.data_lines);
        args.payload_dir.clone_from(&config.payload_dir);
    }

    if args.log_level.is_none() {
        args.log_level.clone_from(&config.log_level);
    }

    Ok(())
}

fn is_explicit(matches: &ArgMatches, name: &str) -> bool {
    matches!(
        matches.value_source(name),
        Some(ValueSource::CommandLine | ValueSource::EnvVariable)
    )
}
