//! Booking run orchestration: spawn workers, join under a deadline,
//! assemble the report.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate};
use futures::future;
use tracing::{info, warn};

use crate::archive::RecordingSink;
use crate::session::SessionFactory;

use super::coordinator::Coordinator;
use super::gate::ReleaseGate;
use super::queue::WorkQueue;
use super::types::{Preference, Report, RunStatus};
use super::worker::Worker;

/// Default join deadline when the caller does not supply one.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(160);

/// Default pause after the post-open refresh, giving the sheet a moment to
/// show newly opened slots.
pub const DEFAULT_REFRESH_SETTLE: Duration = Duration::from_secs(2);

/// Everything one booking run needs.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Acceptable targets in attempt order (already priority-sorted).
    pub preferences: Vec<Preference>,
    /// How many bookings to make.
    pub target_count: usize,
    /// The date being booked.
    pub date: NaiveDate,
    /// When the tee sheet opens.
    pub open_at: DateTime<FixedOffset>,
    /// How long to wait for workers before abandoning them.
    pub overall_deadline: Duration,
    /// Pause after the post-open refresh.
    pub refresh_settle: Duration,
}

impl RunRequest {
    pub fn new(
        preferences: Vec<Preference>,
        target_count: usize,
        date: NaiveDate,
        open_at: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            preferences,
            target_count,
            date,
            open_at,
            overall_deadline: DEFAULT_DEADLINE,
            refresh_settle: DEFAULT_REFRESH_SETTLE,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.overall_deadline = deadline;
        self
    }

    pub fn with_refresh_settle(mut self, settle: Duration) -> Self {
        self.refresh_settle = settle;
        self
    }
}

/// Drives a whole booking run: one worker per desired slot, all racing the
/// same shared queue and reporting into one coordinator.
pub struct BookingRunner {
    factory: Arc<dyn SessionFactory>,
    sink: Option<Arc<dyn RecordingSink>>,
}

impl BookingRunner {
    pub fn new(factory: Arc<dyn SessionFactory>) -> Self {
        Self {
            factory,
            sink: None,
        }
    }

    /// Attach a recording sink; workers hand their recordings to it after
    /// releasing their session.
    pub fn with_recording_sink(mut self, sink: Arc<dyn RecordingSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Run to completion (or deadline) and report.
    ///
    /// Never spawns more workers than there are preferences to try, and
    /// never more than the number of bookings requested. That also bounds
    /// total successes, since each worker books at most once.
    pub async fn run(&self, request: RunRequest) -> Report {
        let requested = request.target_count;

        if requested == 0 {
            warn!("rejecting run: no bookings requested");
            return Report::rejected(requested, "no bookings requested");
        }
        if request.preferences.is_empty() {
            warn!("rejecting run: no preferences configured");
            return Report::rejected(requested, "no preferences configured");
        }

        let worker_count = requested.min(request.preferences.len());
        let queue = Arc::new(WorkQueue::seed(request.preferences));
        let coordinator = Arc::new(Coordinator::new(requested));
        let gate = ReleaseGate::new(request.open_at);

        info!(
            workers = worker_count,
            requested,
            date = %request.date,
            open_at = %request.open_at,
            "spawning booking workers"
        );

        let handles: Vec<_> = (1..=worker_count as u32)
            .map(|id| {
                let worker = Worker::new(
                    id,
                    request.date,
                    gate,
                    request.refresh_settle,
                    Arc::clone(&queue),
                    Arc::clone(&coordinator),
                    Arc::clone(&self.factory),
                    self.sink.clone(),
                );
                tokio::spawn(worker.run())
            })
            .collect();

        // The deadline bounds waiting for workers, not the workers
        // themselves: stragglers keep running detached and still release
        // their own session when they finish.
        match tokio::time::timeout(request.overall_deadline, future::join_all(handles)).await {
            Ok(results) => {
                for (idx, result) in results.into_iter().enumerate() {
                    if let Err(e) = result {
                        warn!(worker = idx as u32 + 1, error = %e, "worker task failed");
                    }
                }
            }
            Err(_) => {
                warn!(
                    deadline_secs = request.overall_deadline.as_secs_f64(),
                    "deadline expired before all workers finished, abandoning stragglers"
                );
            }
        }

        let snapshot = coordinator.snapshot();
        let status = if snapshot.booked_count >= requested {
            RunStatus::Complete
        } else if snapshot.booked_count > 0 {
            RunStatus::Partial
        } else {
            RunStatus::Failed
        };

        info!(
            status = status.as_str(),
            booked = snapshot.booked_count,
            requested,
            failures = snapshot.failures.len(),
            "booking run finished"
        );

        Report {
            status,
            requested,
            booked_count: snapshot.booked_count,
            booked: snapshot.booked,
            failures: snapshot.failures,
            reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockSessionFactory, MockTeeSheet};

    fn runner(factory: Arc<MockSessionFactory>) -> BookingRunner {
        BookingRunner::new(factory as Arc<dyn SessionFactory>)
    }

    #[tokio::test]
    async fn test_zero_target_is_rejected_without_sessions() {
        let sheet = MockTeeSheet::new();
        let factory = Arc::new(MockSessionFactory::new(Arc::clone(&sheet)));

        let request = RunRequest::new(
            fixtures::preference_list(&[("8:07", 10)]),
            0,
            fixtures::booking_date(),
            fixtures::past_open_instant(),
        );
        let report = runner(Arc::clone(&factory)).run(request).await;

        assert_eq!(report.status, RunStatus::Error);
        assert_eq!(factory.created_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_preferences_are_rejected_without_sessions() {
        let sheet = MockTeeSheet::new();
        let factory = Arc::new(MockSessionFactory::new(Arc::clone(&sheet)));

        let request = RunRequest::new(
            Vec::new(),
            2,
            fixtures::booking_date(),
            fixtures::past_open_instant(),
        );
        let report = runner(Arc::clone(&factory)).run(request).await;

        assert_eq!(report.status, RunStatus::Error);
        assert_eq!(report.requested, 2);
        assert_eq!(factory.created_count(), 0);
    }

    #[tokio::test]
    async fn test_worker_count_capped_by_preference_count() {
        let sheet = MockTeeSheet::new();
        sheet.set_open("8:07", 10);
        let factory = Arc::new(MockSessionFactory::new(Arc::clone(&sheet)));

        // Five slots requested, one preference: exactly one worker.
        let request = RunRequest::new(
            fixtures::preference_list(&[("8:07", 10)]),
            5,
            fixtures::booking_date(),
            fixtures::past_open_instant(),
        )
        .with_refresh_settle(Duration::ZERO);
        let report = runner(Arc::clone(&factory)).run(request).await;

        assert_eq!(factory.created_count(), 1);
        assert_eq!(report.booked_count, 1);
        assert_eq!(report.status, RunStatus::Partial);
    }
}
