use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::metrics::RequestOutcome;

/// Append-only outcome log shared by the workers of one run.
///
/// Outcomes are kept in completion order. The contents are read through
/// [`ResultStore::into_outcomes`], which needs ownership and therefore cannot
/// race with workers that still hold a reference.
#[derive(Debug, Default)]
pub struct ResultStore {
    outcomes: Mutex<Vec<RequestOutcome>>,
    completed: AtomicU64,
}

impl ResultStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, outcome: RequestOutcome) {
        let mut outcomes = self.outcomes.lock().unwrap_or_else(PoisonError::into_inner);
        outcomes.push(outcome);
        self.completed.fetch_add(1, Ordering::AcqRel);
    }

    #[must_use]
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The joined snapshot, in completion order.
    #[must_use]
    pub fn into_outcomes(self) -> Vec<RequestOutcome> {
        self.outcomes
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub(super) fn detached_copy(&self) -> Self {
        let outcomes = self
            .outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        Self {
            outcomes: Mutex::new(outcomes),
            completed: AtomicU64::new(self.completed()),
        }
    }
}
