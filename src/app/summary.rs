use crate::config::LoadTestConfig;
use crate::metrics::{ByteTotals, SummaryStatistics};

const LABEL_WIDTH: usize = 34;
const VALUE_WIDTH: usize = 15;
const WIDE_VALUE_WIDTH: usize = 25;

pub(crate) fn summary_lines(config: &LoadTestConfig, summary: &SummaryStatistics) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(String::new());
    lines.push(format!(
        "=== Load Test Results for {} ({}) ===",
        config.target_url, config.method
    ));

    lines.push(row(
        "Overall Transaction Duration [ms]",
        &["Avg", "Min", "Med", "Max", "p(90)", "p(95)"],
        VALUE_WIDTH,
    ));
    let durations = summary.http_req_duration.map_or_else(
        || vec!["-".to_owned(); 6],
        |stats| {
            [stats.avg, stats.min, stats.med, stats.max, stats.p90, stats.p95]
                .iter()
                .map(|value| format!("{:.5}", value))
                .collect()
        },
    );
    lines.push(row("http_req_duration", &durations, VALUE_WIDTH));
    lines.push(String::new());

    lines.push(row(
        "Client-side Requests",
        &["Count", "Rate [req/s]"],
        WIDE_VALUE_WIDTH,
    ));
    lines.push(row(
        "http_req_failed",
        &[
            format!(
                "{:.2}%   {} out of {}",
                summary.failed_ratio * 100.0,
                summary.http_req_failed,
                summary.http_reqs
            ),
            String::new(),
        ],
        WIDE_VALUE_WIDTH,
    ));
    lines.push(row(
        "http_reqs",
        &[
            summary.http_reqs.to_string(),
            format!("{:.5}/s", summary.http_reqs_rate),
        ],
        WIDE_VALUE_WIDTH,
    ));
    lines.push(String::new());

    lines.push(row(
        "Client-side Data Metrics",
        &["Total [bytes]", "Rate [bytes/s]"],
        WIDE_VALUE_WIDTH,
    ));
    lines.push(data_row("data_sent", summary.data_sent));
    lines.push(data_row("data_received", summary.data_received));
    lines
}

fn data_row(label: &str, totals: ByteTotals) -> String {
    row(
        label,
        &[
            format_bytes(totals.total as f64),
            format!("{} /s", format_bytes(totals.rate_per_sec)),
        ],
        WIDE_VALUE_WIDTH,
    )
}

fn row<S: AsRef<str>>(label: &str, values: &[S], width: usize) -> String {
    let cells: String = values
        .iter()
        .map(|value| format!("{:>width$}", value.as_ref(), width = width))
        .collect();
    format!("{:<LABEL_WIDTH$}{}", label, cells)
        .trim_end()
        .to_owned()
}

/// Binary units with two decimals above 1 KB: `512 B`, `0.33 B`, `1.50 KB`.
pub(crate) fn format_bytes(bytes: f64) -> String {
    if bytes < 1024.0 {
        if bytes.fract() == 0.0 {
            return format!("{:.0} B", bytes);
        }
        return format!("{:.2} B", bytes);
    }
    let kb = bytes / 1024.0;
    if kb < 1024.0 {
        return format!("{:.2} KB", kb);
    }
    let mb = kb / 1024.0;
    if mb < 1024.0 {
        return format!("{:.2} MB", mb);
    }
    format!("{:.2} GB", mb / 1024.0)
}
