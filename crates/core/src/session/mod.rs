//! Booking session abstraction.
//!
//! This module provides the `Session` trait (a worker's private driver for
//! the booking surface) and the `SessionFactory` that mints one per worker.
//! The shipped implementation talks to a ClubHouse Online member portal
//! over HTTP.

mod clubhouse;
mod types;

pub use clubhouse::{ClubhouseSession, ClubhouseSessionFactory};
pub use types::{ClaimOutcome, Session, SessionError, SessionFactory};
