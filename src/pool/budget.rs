use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Notify;

/// Shared iteration budget. A worker reserves a slot before sending and either
/// commits it (the outcome was recorded) or lets it drop (the attempt did not
/// count), which hands the slot back.
///
/// The budget is spent once `committed` reaches the limit. While slots are
/// only reserved, a released slot can still come back, so callers of
/// [`RequestBudget::reserve`] wait for it instead of leaving.
#[derive(Debug)]
pub(super) struct RequestBudget {
    limit: Option<u64>,
    reserved: AtomicU64,
    committed: AtomicU64,
    changed: Notify,
}

impl RequestBudget {
    pub(super) fn new(limit: Option<u64>) -> Self {
        Self {
            limit,
            reserved: AtomicU64::new(0),
            committed: AtomicU64::new(0),
            changed: Notify::new(),
        }
    }

    /// Waits for a slot. Returns `None` only once the budget is spent.
    pub(super) async fn reserve(&self) -> Option<BudgetSlot<'_>> {
        loop {
            let changed = self.changed.notified();
            tokio::pin!(changed);
            // Registered before the checks so a release in between is not missed.
            changed.as_mut().enable();

            if let Some(slot) = self.try_reserve() {
                return Some(slot);
            }
            if self.is_spent() {
                return None;
            }
            changed.await;
        }
    }

    /// Returns `None` while every slot is reserved or committed.
    pub(super) fn try_reserve(&self) -> Option<BudgetSlot<'_>> {
        let Some(limit) = self.limit else {
            return Some(BudgetSlot::new(self));
        };
        loop {
            let current = self.reserved.load(Ordering::Acquire);
            if current >= limit {
                return None;
            }
            let next = current.checked_add(1)?;
            if self
                .reserved
                .compare_exchange(current, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Some(BudgetSlot::new(self));
            }
        }
    }

    pub(super) fn is_spent(&self) -> bool {
        self.limit
            .is_some_and(|limit| self.committed.load(Ordering::Acquire) >= limit)
    }

    #[cfg(test)]
    pub(super) fn reserved(&self) -> u64 {
        self.reserved.load(Ordering::Acquire)
    }

    #[cfg(test)]
    pub(super) fn committed(&self) -> u64 {
        self.committed.load(Ordering::Acquire)
    }

    fn commit(&self) {
        if self.limit.is_none() {
            return;
        }
        self.committed.fetch_add(1, Ordering::AcqRel);
        self.changed.notify_waiters();
    }

    fn release(&self) {
        if self.limit.is_none() {
            return;
        }
        loop {
            let current = self.reserved.load(Ordering::Acquire);
            let Some(next) = current.checked_sub(1) else {
                break;
            };
            if self
                .reserved
                .compare_exchange(current, next, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                break;
            }
        }
        self.changed.notify_waiters();
    }
}

pub(super) struct BudgetSlot<'budget> {
    budget: &'budget RequestBudget,
    committed: bool,
}

impl<'budget> BudgetSlot<'budget> {
    const fn new(budget: &'budget RequestBudget) -> Self {
        Self {
            budget,
            committed: false,
        }
    }

    pub(super) fn commit(mut self) {
        self.committed = true;
        self.budget.commit();
    }
}

impl Drop for BudgetSlot<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.budget.release();
        }
    }
}
