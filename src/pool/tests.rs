use super::budget::RequestBudget;
use super::*;
use crate::error::PayloadError;
use crate::metrics::{OutcomeStatus, RequestOutcome, UPSTREAM_UNAVAILABLE_STATUS};
use crate::payload::Payload;
use async_trait::async_trait;
use rand::Rng;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

struct StaticPayloads;

#[async_trait]
impl PayloadSource for StaticPayloads {
    async fn next_payload(&self) -> Result<Payload, PayloadError> {
        Ok(Payload::text("body".to_owned()))
    }
}

/// Fails the very first call, succeeds afterwards.
struct FirstCallFails {
    calls: AtomicUsize,
}

#[async_trait]
impl PayloadSource for FirstCallFails {
    async fn next_payload(&self) -> Result<Payload, PayloadError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Err(PayloadError::NoFiles {
                path: "missing".into(),
            });
        }
        Ok(Payload::default())
    }
}

/// First call stalls, then fails; every later call succeeds at once.
struct SlowFirstFailure {
    calls: AtomicUsize,
}

#[async_trait]
impl PayloadSource for SlowFirstFailure {
    async fn next_payload(&self) -> Result<Payload, PayloadError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            return Err(PayloadError::NoFiles {
                path: "missing".into(),
            });
        }
        Ok(Payload::default())
    }
}

/// Answers 200 after a random 0-3ms delay.
struct JitterExecutor {
    calls: AtomicUsize,
}

#[async_trait]
impl RequestExecutor for JitterExecutor {
    async fn send(&self, _method: HttpMethod, payload: Payload) -> RequestOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = rand::thread_rng().gen_range(0..=3);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        RequestOutcome::new(OutcomeStatus::Code(200), 1.0, payload.len(), 2)
    }
}

/// Answers 502 for the first `soft_responses` calls, then 200.
struct FlakyUpstream {
    soft_responses: usize,
    calls: AtomicUsize,
}

#[async_trait]
impl RequestExecutor for FlakyUpstream {
    async fn send(&self, _method: HttpMethod, _payload: Payload) -> RequestOutcome {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let status = if call < self.soft_responses {
            UPSTREAM_UNAVAILABLE_STATUS
        } else {
            200
        };
        RequestOutcome::new(OutcomeStatus::Code(status), 1.0, 0, 0)
    }
}

/// Unwinds on its first call.
struct PanicsOnce {
    calls: AtomicUsize,
}

#[async_trait]
impl RequestExecutor for PanicsOnce {
    async fn send(&self, _method: HttpMethod, _payload: Payload) -> RequestOutcome {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            std::panic::resume_unwind(Box::new("executor exploded"));
        }
        tokio::task::yield_now().await;
        RequestOutcome::new(OutcomeStatus::Code(200), 1.0, 0, 0)
    }
}

fn jitter() -> Arc<JitterExecutor> {
    Arc::new(JitterExecutor {
        calls: AtomicUsize::new(0),
    })
}

#[test]
fn iteration_budget_is_never_overshot() -> Result<(), String> {
    run_async_test(async {
        for round in 0..25 {
            let pool = WorkerPool::new(5, TerminationMode::Iterations(3), HttpMethod::Get);
            let store = pool.run(Arc::new(StaticPayloads), jitter()).await;
            if store.completed() != 3 || store.len() != 3 {
                return Err(format!(
                    "Round {}: expected 3 outcomes, got len {} completed {}",
                    round,
                    store.len(),
                    store.completed()
                ));
            }
        }
        Ok(())
    })
}

#[test]
fn large_budget_is_met_exactly() -> Result<(), String> {
    run_async_test(async {
        let executor = jitter();
        let pool = WorkerPool::new(16, TerminationMode::Iterations(200), HttpMethod::Post);
        let store = pool.run(Arc::new(StaticPayloads), executor.clone()).await;
        let outcomes = store.into_outcomes();
        if outcomes.len() != 200 {
            return Err(format!("Expected 200 outcomes, got {}", outcomes.len()));
        }
        if executor.calls.load(Ordering::SeqCst) != 200 {
            return Err("Every counted request should be sent exactly once".to_owned());
        }
        if outcomes.iter().any(|outcome| outcome.bytes_sent != 4) {
            return Err("Payload size was not carried into the outcome".to_owned());
        }
        Ok(())
    })
}

#[test]
fn soft_upstream_responses_are_retried_without_counting() -> Result<(), String> {
    run_async_test(async {
        let executor = Arc::new(FlakyUpstream {
            soft_responses: 10,
            calls: AtomicUsize::new(0),
        });
        let pool = WorkerPool::new(1, TerminationMode::Iterations(1), HttpMethod::Get);
        let store = pool.run(Arc::new(StaticPayloads), executor.clone()).await;
        if store.completed() != 1 {
            return Err(format!("Expected 1 counted outcome, got {}", store.completed()));
        }
        let outcomes = store.into_outcomes();
        if outcomes.iter().any(|outcome| outcome.is_upstream_unavailable()) {
            return Err("Soft responses must not be recorded".to_owned());
        }
        if executor.calls.load(Ordering::SeqCst) != 11 {
            return Err(format!(
                "Expected 11 attempts, got {}",
                executor.calls.load(Ordering::SeqCst)
            ));
        }
        Ok(())
    })
}

#[test]
fn soft_responses_with_many_workers_still_fill_budget() -> Result<(), String> {
    run_async_test(async {
        let executor = Arc::new(FlakyUpstream {
            soft_responses: 40,
            calls: AtomicUsize::new(0),
        });
        let pool = WorkerPool::new(4, TerminationMode::Iterations(5), HttpMethod::Get);
        let store = pool.run(Arc::new(StaticPayloads), executor).await;
        if store.len() != 5 {
            return Err(format!("Expected 5 outcomes, got {}", store.len()));
        }
        Ok(())
    })
}

#[test]
fn duration_mode_stops_after_deadline() -> Result<(), String> {
    run_async_test(async {
        let started = std::time::Instant::now();
        let pool = WorkerPool::new(
            3,
            TerminationMode::Duration(Duration::from_millis(150)),
            HttpMethod::Get,
        );
        let store = pool.run(Arc::new(StaticPayloads), jitter()).await;
        let elapsed = started.elapsed();
        if store.is_empty() {
            return Err("Expected some outcomes".to_owned());
        }
        if elapsed < Duration::from_millis(150) || elapsed > Duration::from_secs(5) {
            return Err(format!("Unexpected run length: {:?}", elapsed));
        }
        if store.len() != usize::try_from(store.completed()).unwrap_or(usize::MAX) {
            return Err("Store length and completed count diverged".to_owned());
        }
        Ok(())
    })
}

#[test]
fn zero_users_or_zero_budget_send_nothing() -> Result<(), String> {
    run_async_test(async {
        let executor = jitter();
        let no_users = WorkerPool::new(0, TerminationMode::Iterations(5), HttpMethod::Get);
        let store = no_users
            .run(Arc::new(StaticPayloads), executor.clone())
            .await;
        if !store.is_empty() {
            return Err("Expected empty store for zero users".to_owned());
        }
        let no_budget = WorkerPool::new(4, TerminationMode::Iterations(0), HttpMethod::Get);
        let store = no_budget
            .run(Arc::new(StaticPayloads), executor.clone())
            .await;
        if !store.is_empty() {
            return Err("Expected empty store for zero budget".to_owned());
        }
        if executor.calls.load(Ordering::SeqCst) != 0 {
            return Err("No request should have been sent".to_owned());
        }
        Ok(())
    })
}

#[test]
fn payload_failure_ends_only_that_worker() -> Result<(), String> {
    run_async_test(async {
        let payloads = Arc::new(FirstCallFails {
            calls: AtomicUsize::new(0),
        });
        let pool = WorkerPool::new(3, TerminationMode::Iterations(6), HttpMethod::Get);
        let store = pool.run(payloads, jitter()).await;
        if store.len() != 6 {
            return Err(format!("Expected siblings to finish the budget, got {}", store.len()));
        }
        Ok(())
    })
}

#[test]
fn slot_released_by_failed_worker_is_used_by_siblings() -> Result<(), String> {
    run_async_test(async {
        for round in 0..5 {
            let payloads = Arc::new(SlowFirstFailure {
                calls: AtomicUsize::new(0),
            });
            let pool = WorkerPool::new(3, TerminationMode::Iterations(3), HttpMethod::Get);
            let store = pool.run(payloads, jitter()).await;
            if store.len() != 3 {
                return Err(format!(
                    "Round {}: budget 3 with 2 healthy workers recorded {}",
                    round,
                    store.len()
                ));
            }
        }
        Ok(())
    })
}

#[test]
fn reserve_waits_for_released_slot() -> Result<(), String> {
    run_async_test(async {
        let budget = Arc::new(RequestBudget::new(Some(1)));
        let held = budget.try_reserve().ok_or_else(|| "first slot".to_owned())?;

        let waiter = {
            let budget = Arc::clone(&budget);
            tokio::spawn(async move {
                let slot = budget.reserve().await;
                let granted = slot.is_some();
                if let Some(slot) = slot {
                    slot.commit();
                }
                granted
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        if waiter.is_finished() {
            return Err("Reserve should wait while the only slot is held".to_owned());
        }

        drop(held);
        let granted = tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .map_err(|_elapsed| "Waiter never woke up".to_owned())?
            .map_err(|err| err.to_string())?;
        if !granted {
            return Err("Released slot should be handed to the waiter".to_owned());
        }
        if !budget.is_spent() || budget.committed() != 1 {
            return Err("Budget should be spent after the commit".to_owned());
        }
        if budget.reserve().await.is_some() {
            return Err("Spent budget must not hand out slots".to_owned());
        }
        Ok(())
    })
}

#[test]
fn panicking_worker_does_not_abort_the_pool() -> Result<(), String> {
    run_async_test(async {
        let executor = Arc::new(PanicsOnce {
            calls: AtomicUsize::new(0),
        });
        let pool = WorkerPool::new(3, TerminationMode::Iterations(4), HttpMethod::Get);
        let store = pool.run(Arc::new(StaticPayloads), executor).await;
        if store.len() != 4 {
            return Err(format!("Expected 4 outcomes, got {}", store.len()));
        }
        Ok(())
    })
}

#[test]
fn budget_slots_are_released_unless_committed() -> Result<(), String> {
    let budget = RequestBudget::new(Some(2));
    let first = budget.try_reserve().ok_or_else(|| "first slot".to_owned())?;
    let second = budget.try_reserve().ok_or_else(|| "second slot".to_owned())?;
    if budget.try_reserve().is_some() {
        return Err("Budget should be exhausted".to_owned());
    }
    drop(second);
    if budget.reserved() != 1 {
        return Err("Dropped slot should be released".to_owned());
    }
    first.commit();
    let third = budget.try_reserve().ok_or_else(|| "released slot".to_owned())?;
    third.commit();
    if budget.try_reserve().is_some() || budget.reserved() != 2 {
        return Err("Committed slots should stay taken".to_owned());
    }
    Ok(())
}

#[test]
fn unlimited_budget_always_reserves() -> Result<(), String> {
    let budget = RequestBudget::new(None);
    for _ in 0..1_000 {
        let slot = budget
            .try_reserve()
            .ok_or_else(|| "Unlimited budget refused a slot".to_owned())?;
        slot.commit();
    }
    if budget.reserved() != 0 {
        return Err("Unlimited budget should not count".to_owned());
    }
    Ok(())
}

#[test]
fn concurrent_appends_are_not_lost() -> Result<(), String> {
    run_async_test(async {
        let store = Arc::new(ResultStore::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    store.append(RequestOutcome::new(OutcomeStatus::Code(200), 1.0, 0, 0));
                    tokio::task::yield_now().await;
                }
            }));
        }
        for handle in handles {
            handle.await.map_err(|err| err.to_string())?;
        }
        if store.len() != 800 || store.completed() != 800 {
            return Err(format!("Expected 800 outcomes, got {}", store.len()));
        }
        Ok(())
    })
}
