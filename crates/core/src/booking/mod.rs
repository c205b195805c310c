//! The timed-release booking coordinator.
//!
//! Workers race each other for a shared, priority-ordered list of tee time
//! preferences the moment the sheet opens:
//! - **Queue**: exactly-once, non-blocking hand-out of preferences
//! - **Coordinator**: consistent success/failure aggregation
//! - **Gate**: wall-clock alignment of workers on the open instant
//! - **Worker**: one session, one booking, full state machine
//! - **Runner**: spawn, join under deadline, report

mod coordinator;
mod gate;
mod queue;
mod runner;
mod types;
mod worker;

pub use coordinator::{Coordinator, CoordinatorSnapshot};
pub use gate::{next_play_date, ReleaseGate};
pub use queue::WorkQueue;
pub use runner::{BookingRunner, RunRequest, DEFAULT_DEADLINE, DEFAULT_REFRESH_SETTLE};
pub use types::{
    FailureReason, FailureRecord, Preference, Report, RunStatus, SuccessRecord, Transport,
};
pub use worker::Worker;
