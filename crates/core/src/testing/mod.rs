//! Testing utilities and mock implementations.
//!
//! Mock implementations of the external collaborator traits, allowing the
//! whole booking pipeline to be exercised without a member portal.
//!
//! # Example
//!
//! ```rust,ignore
//! use teebot_core::testing::{fixtures, MockSessionFactory, MockTeeSheet};
//!
//! let sheet = MockTeeSheet::new();
//! sheet.set_open("8:07", 10);
//!
//! let factory = MockSessionFactory::new(sheet);
//! // Use in a BookingRunner...
//! ```

mod mock_session;
mod mock_sink;

pub use mock_session::{MockSession, MockSessionFactory, MockTeeSheet};
pub use mock_sink::MockRecordingSink;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, NaiveDate, Utc};

    use crate::booking::{Preference, Transport};

    /// Create a test preference with reasonable defaults.
    pub fn preference(priority: u32, time: &str, hole: u8) -> Preference {
        Preference {
            priority,
            time: time.to_string(),
            hole,
            holes_to_play: 18,
            transport: Transport::Cart,
        }
    }

    /// Build a priority-ordered preference list from `(time, hole)` pairs.
    pub fn preference_list(slots: &[(&str, u8)]) -> Vec<Preference> {
        slots
            .iter()
            .enumerate()
            .map(|(idx, (time, hole))| preference(idx as u32 + 1, time, *hole))
            .collect()
    }

    /// A fixed Saturday to book against.
    pub fn booking_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 8).unwrap()
    }

    /// An open instant that has already passed: the gate releases
    /// immediately.
    pub fn past_open_instant() -> DateTime<FixedOffset> {
        Utc::now().fixed_offset() - ChronoDuration::seconds(1)
    }

    /// An open instant `secs` seconds from now.
    pub fn open_instant_in(secs: i64) -> DateTime<FixedOffset> {
        Utc::now().fixed_offset() + ChronoDuration::seconds(secs)
    }
}
