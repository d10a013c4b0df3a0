//! Virtual-user scheduling: spawns the workers, enforces the termination
//! budget, and hands the joined results to the caller.
mod budget;
mod store;
mod worker;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::args::HttpMethod;
use crate::config::{LoadTestConfig, TerminationMode};
use crate::http::RequestExecutor;
use crate::payload::PayloadSource;

use budget::RequestBudget;
use worker::{WorkerContext, run_worker};

pub use store::ResultStore;

#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    virtual_users: usize,
    termination: TerminationMode,
    method: HttpMethod,
}

impl WorkerPool {
    #[must_use]
    pub const fn new(virtual_users: usize, termination: TerminationMode, method: HttpMethod) -> Self {
        Self {
            virtual_users,
            termination,
            method,
        }
    }

    #[must_use]
    pub const fn from_config(config: &LoadTestConfig) -> Self {
        Self::new(config.virtual_users.get(), config.termination, config.method)
    }

    /// Runs every virtual user to completion and returns the joined results.
    ///
    /// A worker whose payload source fails, or that panics, is logged and
    /// dropped; the others keep going.
    pub async fn run(
        &self,
        payloads: Arc<dyn PayloadSource>,
        executor: Arc<dyn RequestExecutor>,
    ) -> ResultStore {
        let limit = match self.termination {
            TerminationMode::Iterations(limit) => Some(limit),
            TerminationMode::Duration(_) => None,
        };
        if self.virtual_users == 0 || limit == Some(0) {
            info!("Nothing to run: no virtual users or an empty iteration budget.");
            return ResultStore::new();
        }

        let start = Instant::now();
        let deadline = match self.termination {
            TerminationMode::Duration(duration) => {
                let deadline = start.checked_add(duration);
                if deadline.is_none() {
                    warn!("Duration {:?} overflows the clock; running unbounded.", duration);
                }
                deadline
            }
            TerminationMode::Iterations(_) => None,
        };

        let store = Arc::new(ResultStore::new());
        let budget = Arc::new(RequestBudget::new(limit));
        let mut handles = Vec::with_capacity(self.virtual_users);
        for id in 1..=self.virtual_users {
            let context = WorkerContext {
                id,
                method: self.method,
                deadline,
                budget: Arc::clone(&budget),
                store: Arc::clone(&store),
                payloads: Arc::clone(&payloads),
                executor: Arc::clone(&executor),
            };
            handles.push((id, tokio::spawn(run_worker(context))));
        }

        for (id, handle) in handles {
            if let Err(err) = handle.await {
                error!("Worker {} aborted: {}", id, err);
            }
        }

        info!(
            "Workers joined after {}ms with {} recorded outcomes.",
            start.elapsed().as_millis(),
            store.completed()
        );

        Arc::try_unwrap(store).unwrap_or_else(|shared| shared.detached_copy())
    }
}
