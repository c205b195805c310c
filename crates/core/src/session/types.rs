//! Types and traits for booking sessions.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::booking::Transport;

/// Errors that can occur while driving a booking session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication rejected: {0}")]
    AuthenticationFailed(String),

    #[error("Booking surface unreachable: {0}")]
    NavigationFailed(String),

    #[error("Date not present on tee sheet: {0}")]
    DateNotFound(NaiveDate),

    #[error("Portal error: {0}")]
    PortalError(String),

    #[error("Request timeout")]
    Timeout,
}

/// Outcome of a claim attempt for one tee time.
///
/// A fault during the attempt is reported as `Err(SessionError)`, not as a
/// variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The slot was available and is now held by this session.
    Claimed,
    /// The slot was gone by the time the claim landed.
    Unavailable,
}

/// One worker's private driver for the booking surface.
///
/// A session is a single unit of exclusive execution state; it is owned by
/// exactly one worker and never shared. The core calls these capabilities
/// and nothing else; element locators, endpoints, and protocol detail all
/// live behind this trait.
#[async_trait]
pub trait Session: Send {
    /// Implementation name for logging.
    fn name(&self) -> &str;

    /// Log in to the member portal.
    async fn authenticate(&mut self) -> Result<(), SessionError>;

    /// Navigate to the tee sheet.
    async fn open_tee_sheet(&mut self) -> Result<(), SessionError>;

    /// Select (or re-select, to refresh availability) the booking date.
    async fn select_date(&mut self, date: NaiveDate) -> Result<(), SessionError>;

    /// Try to claim one tee time slot.
    async fn attempt_claim(&mut self, time: &str, hole: u8) -> Result<ClaimOutcome, SessionError>;

    /// Attach the configured companions to the booking just claimed.
    /// Returns how many were attached.
    async fn attach_companions(
        &mut self,
        holes_to_play: u8,
        transport: Transport,
    ) -> Result<u32, SessionError>;

    /// Release the session. Must be safe to call on any path, including
    /// after earlier calls failed.
    async fn release(&mut self);

    /// Recording artifact produced by this session, if any. Only
    /// meaningful after `release`.
    fn recording_path(&self) -> Option<PathBuf> {
        None
    }
}

/// Creates one session per worker.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn create(&self, worker: u32) -> Result<Box<dyn Session>, SessionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SessionError::AuthenticationFailed("bad password".to_string());
        assert_eq!(err.to_string(), "Authentication rejected: bad password");

        let date = NaiveDate::from_ymd_opt(2026, 8, 8).unwrap();
        let err = SessionError::DateNotFound(date);
        assert_eq!(err.to_string(), "Date not present on tee sheet: 2026-08-08");
    }

    #[test]
    fn test_claim_outcome_equality() {
        assert_eq!(ClaimOutcome::Claimed, ClaimOutcome::Claimed);
        assert_ne!(ClaimOutcome::Claimed, ClaimOutcome::Unavailable);
    }
}
