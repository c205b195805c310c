//! One booking worker: a single agent racing for a single tee time.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::archive::RecordingSink;
use crate::session::{ClaimOutcome, Session, SessionFactory};

use super::coordinator::Coordinator;
use super::gate::ReleaseGate;
use super::queue::WorkQueue;
use super::types::FailureReason;

/// A worker owns one session and runs the full booking sequence to
/// completion: authenticate, position on the booking date, wait for the
/// sheet to open, then pull preferences off the shared queue until it books
/// one or runs out of reasons to continue.
///
/// A worker books at most once. Everything it learns is reported through
/// the coordinator; nothing else escapes.
pub struct Worker {
    id: u32,
    date: NaiveDate,
    gate: ReleaseGate,
    refresh_settle: Duration,
    queue: Arc<WorkQueue>,
    coordinator: Arc<Coordinator>,
    factory: Arc<dyn SessionFactory>,
    sink: Option<Arc<dyn RecordingSink>>,
}

impl Worker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        date: NaiveDate,
        gate: ReleaseGate,
        refresh_settle: Duration,
        queue: Arc<WorkQueue>,
        coordinator: Arc<Coordinator>,
        factory: Arc<dyn SessionFactory>,
        sink: Option<Arc<dyn RecordingSink>>,
    ) -> Self {
        Self {
            id,
            date,
            gate,
            refresh_settle,
            queue,
            coordinator,
            factory,
            sink,
        }
    }

    /// Run to completion. Never returns an error; every outcome is a
    /// coordinator record.
    pub async fn run(self) {
        let mut session = match self.factory.create(self.id).await {
            Ok(session) => session,
            Err(e) => {
                warn!(worker = self.id, error = %e, "failed to acquire session");
                self.coordinator
                    .record_failure(self.id, None, FailureReason::AuthenticationFailed);
                return;
            }
        };

        self.compete(session.as_mut()).await;

        // Teardown runs on every path out of the competition.
        session.release().await;
        if let (Some(sink), Some(recording)) = (&self.sink, session.recording_path()) {
            if let Err(e) = sink.archive(self.id, &recording).await {
                warn!(worker = self.id, error = %e, "failed to archive recording");
            }
        }
    }

    async fn compete(&self, session: &mut dyn Session) {
        if let Err(e) = session.authenticate().await {
            warn!(worker = self.id, error = %e, "login failed");
            self.coordinator
                .record_failure(self.id, None, FailureReason::AuthenticationFailed);
            return;
        }
        debug!(worker = self.id, "logged in");

        if let Err(e) = session.open_tee_sheet().await {
            warn!(worker = self.id, error = %e, "could not reach tee sheet");
            self.coordinator
                .record_failure(self.id, None, FailureReason::NavigationFailed);
            return;
        }

        if let Err(e) = session.select_date(self.date).await {
            warn!(worker = self.id, date = %self.date, error = %e, "booking date not found");
            self.coordinator
                .record_failure(self.id, None, FailureReason::DateNotFound);
            return;
        }
        info!(worker = self.id, date = %self.date, "positioned on tee sheet");

        self.gate.wait_until_open().await;

        // Re-select the date to pick up availability that opened at the
        // gate instant; the sheet may briefly lag, so give it a moment.
        if let Err(e) = session.select_date(self.date).await {
            warn!(worker = self.id, error = %e, "post-open refresh failed");
        }
        if !self.refresh_settle.is_zero() {
            tokio::time::sleep(self.refresh_settle).await;
        }

        loop {
            if self.coordinator.target_reached() {
                debug!(worker = self.id, "target already met, standing down");
                return;
            }

            let Some(pref) = self.queue.try_take() else {
                debug!(worker = self.id, "no preferences left");
                return;
            };

            debug!(
                worker = self.id,
                priority = pref.priority,
                time = %pref.time,
                hole = pref.hole,
                "attempting claim"
            );

            match session.attempt_claim(&pref.time, pref.hole).await {
                Ok(ClaimOutcome::Claimed) => {
                    let guests = match session
                        .attach_companions(pref.holes_to_play, pref.transport)
                        .await
                    {
                        Ok(count) => count,
                        Err(e) => {
                            warn!(worker = self.id, error = %e, "companion attachment failed");
                            0
                        }
                    };
                    info!(
                        worker = self.id,
                        time = %pref.time,
                        hole = pref.hole,
                        guests,
                        "booked"
                    );
                    self.coordinator.record_success(self.id, pref, guests);
                    // One booking per worker.
                    return;
                }
                Ok(ClaimOutcome::Unavailable) => {
                    info!(worker = self.id, time = %pref.time, hole = pref.hole, "unavailable");
                    self.coordinator
                        .record_failure(self.id, Some(pref), FailureReason::Unavailable);
                }
                Err(e) => {
                    warn!(worker = self.id, error = %e, "claim attempt faulted");
                    self.coordinator
                        .record_failure(self.id, Some(pref), FailureReason::SessionFault);
                }
            }
        }
    }
}
