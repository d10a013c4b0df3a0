use clap::Parser;
use std::time::Duration;

use super::parsers::{parse_duration_arg, parse_positive_u64, parse_positive_usize};
use super::types::{HttpMethod, PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Async HTTP load generator - concurrent virtual users, iteration or duration budgets, nearest-rank latency summaries."
)]
pub struct LoadArgs {
    /// Target URL for the load test
    #[arg(long, short, env = "SWARMLOAD_URL")]
    pub url: Option<String>,

    /// HTTP method to use
    #[arg(long, short = 'X', default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// Number of concurrent virtual users
    #[arg(long = "vus", short = 'c', default_value = "1", value_parser = parse_positive_usize)]
    pub vus: PositiveUsize,

    /// Run length (supports ms/s/m/h; a bare number is milliseconds)
    #[arg(long = "duration", short = 't', value_parser = parse_duration_arg)]
    pub duration: Option<Duration>,

    /// Stop after this many counted requests instead of a duration
    #[arg(
        long = "iterations",
        short = 'n',
        value_parser = parse_positive_u64,
        conflicts_with = "duration"
    )]
    pub iterations: Option<PositiveU64>,

    /// Per-request timeout (supports ms/s/m/h; a bare number is milliseconds)
    #[arg(long = "timeout", default_value = "10s", value_parser = parse_duration_arg)]
    pub request_timeout: Duration,

    /// Static request body
    #[arg(long, short)]
    pub data: Option<String>,

    /// Rotate request bodies through the non-empty lines of a file
    #[arg(long = "data-lines", conflicts_with_all = ["data", "payload_dir"])]
    pub data_lines: Option<String>,

    /// Send a random file from this directory per request, wrapped as {"data": ...}
    #[arg(long = "payload-dir", conflicts_with = "data")]
    pub payload_dir: Option<String>,

    /// Path to a TOML or JSON config file
    #[arg(long)]
    pub config: Option<String>,

    /// Write the summary and raw outcomes as JSON to this path
    #[arg(long = "json")]
    pub export_json: Option<String>,

    /// Log filter directive (e.g. info, debug, swarmload=trace)
    #[arg(long = "log-level")]
    pub log_level: Option<String>,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,

    /// Disable ANSI colours in log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
