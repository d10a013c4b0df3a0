use std::sync::Arc;

use tokio::time::Instant;
use tracing::{debug, error, warn};

use crate::args::HttpMethod;
use crate::error::PayloadError;
use crate::http::RequestExecutor;
use crate::payload::PayloadSource;

use super::budget::RequestBudget;
use super::store::ResultStore;

/// Consecutive soft retries between "upstream still unavailable" warnings.
const SOFT_RETRY_WARN_EVERY: u64 = 10;

pub(super) struct WorkerContext {
    pub(super) id: usize,
    pub(super) method: HttpMethod,
    pub(super) deadline: Option<Instant>,
    pub(super) budget: Arc<RequestBudget>,
    pub(super) store: Arc<ResultStore>,
    pub(super) payloads: Arc<dyn PayloadSource>,
    pub(super) executor: Arc<dyn RequestExecutor>,
}

pub(super) async fn run_worker(context: WorkerContext) {
    match request_loop(&context).await {
        Ok(recorded) => debug!("Worker {} finished after {} requests.", context.id, recorded),
        Err(err) => error!("Error in worker {}: {}", context.id, err),
    }
}

async fn request_loop(context: &WorkerContext) -> Result<u64, PayloadError> {
    let mut recorded: u64 = 0;
    let mut soft_retries: u64 = 0;
    loop {
        if context
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            break;
        }
        let Some(slot) = context.budget.reserve().await else {
            break;
        };

        let payload = context.payloads.next_payload().await?;
        let outcome = context.executor.send(context.method, payload).await;

        if outcome.is_upstream_unavailable() {
            // Not a sample and not a failure: hand the slot back and go again.
            drop(slot);
            soft_retries = soft_retries.saturating_add(1);
            if soft_retries % SOFT_RETRY_WARN_EVERY == 0 {
                warn!(
                    "Worker {}: upstream unavailable for {} consecutive attempts.",
                    context.id, soft_retries
                );
            }
            continue;
        }

        soft_retries = 0;
        context.store.append(outcome);
        slot.commit();
        recorded = recorded.saturating_add(1);
    }
    Ok(recorded)
}
