//! Shared aggregation of booking outcomes.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::{FailureReason, FailureRecord, Preference, SuccessRecord};

/// Thread-safe aggregator of success/failure records and progress toward
/// the run's target.
///
/// All mutation happens under one mutex, so the booked count and the record
/// lists can never be observed out of step with each other. Workers only
/// ever talk to the run through this object.
#[derive(Debug)]
pub struct Coordinator {
    target: usize,
    inner: Mutex<Records>,
}

#[derive(Debug, Default)]
struct Records {
    booked_count: usize,
    booked: Vec<SuccessRecord>,
    failures: Vec<FailureRecord>,
}

/// A consistent point-in-time copy of coordinator state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorSnapshot {
    pub target: usize,
    pub booked_count: usize,
    pub booked: Vec<SuccessRecord>,
    pub failures: Vec<FailureRecord>,
}

impl Coordinator {
    /// Create a coordinator for a run aiming at `target` bookings.
    pub fn new(target: usize) -> Self {
        Self {
            target,
            inner: Mutex::new(Records::default()),
        }
    }

    /// The slot count this run is aiming for.
    pub fn target(&self) -> usize {
        self.target
    }

    /// Record a booked tee time.
    ///
    /// Safe to call after the target is already met; each worker books at
    /// most once, so the total can never exceed the worker count.
    pub fn record_success(&self, worker: u32, preference: Preference, guests_added: u32) {
        let mut records = self.inner.lock().expect("coordinator lock poisoned");
        records.booked_count += 1;
        debug!(
            worker,
            time = %preference.time,
            hole = preference.hole,
            booked = records.booked_count,
            "booking recorded"
        );
        records.booked.push(SuccessRecord {
            worker,
            preference,
            guests_added,
        });
    }

    /// Record a failed setup phase (`preference = None`) or claim attempt.
    pub fn record_failure(&self, worker: u32, preference: Option<Preference>, reason: FailureReason) {
        let mut records = self.inner.lock().expect("coordinator lock poisoned");
        records.failures.push(FailureRecord {
            worker,
            preference,
            reason,
        });
    }

    /// Whether the run has met its target.
    ///
    /// A hint for workers to stop pulling new work, not a hard gate: a
    /// worker may still complete a claim it had already started.
    pub fn target_reached(&self) -> bool {
        let records = self.inner.lock().expect("coordinator lock poisoned");
        records.booked_count >= self.target
    }

    /// Consistent copy of all state, taken under the same lock the records
    /// are written under.
    pub fn snapshot(&self) -> CoordinatorSnapshot {
        let records = self.inner.lock().expect("coordinator lock poisoned");
        CoordinatorSnapshot {
            target: self.target,
            booked_count: records.booked_count,
            booked: records.booked.clone(),
            failures: records.failures.clone(),
        }
    }
}
