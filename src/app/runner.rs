use std::sync::Arc;

use tracing::info;

use crate::config::LoadTestConfig;
use crate::error::AppResult;
use crate::http::{HttpExecutor, RequestExecutor, build_client};
use crate::metrics::{StatsAggregator, SummaryStatistics};
use crate::payload::{BodySource, PayloadSource};
use crate::pool::WorkerPool;

use super::export::export_json;
use super::summary::summary_lines;

pub(crate) async fn run_local(
    config: LoadTestConfig,
    export_path: Option<&str>,
) -> AppResult<SummaryStatistics> {
    let payloads: Arc<dyn PayloadSource> = Arc::new(BodySource::from_spec(&config.payload)?);
    let executor: Arc<dyn RequestExecutor> = Arc::new(HttpExecutor::new(
        build_client()?,
        &config.target_url,
        config.request_timeout,
    )?);

    info!(
        "Starting load test on {} with {} VUs...",
        config.target_url,
        config.virtual_users.get()
    );
    let store = WorkerPool::from_config(&config)
        .run(payloads, executor)
        .await;
    info!("Load test completed.");

    let outcomes = store.into_outcomes();
    let summary = StatsAggregator::new(config.rate_window()).summarize(&outcomes);

    for line in summary_lines(&config, &summary) {
        println!("{}", line);
    }

    if let Some(path) = export_path {
        export_json(path, &summary, &outcomes).await?;
        info!("Wrote JSON results to {}", path);
    }

    Ok(summary)
}
