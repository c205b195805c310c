//! Value types shared across a booking run.

use serde::{Deserialize, Serialize};

/// How the party gets around the course.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    #[default]
    Cart,
    Walk,
    WalkRide,
}

impl Transport {
    /// Returns the string representation used in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Transport::Cart => "cart",
            Transport::Walk => "walk",
            Transport::WalkRide => "walk_ride",
        }
    }

    /// Lenient parse for spreadsheet input.
    ///
    /// Accepts the sheet vocabulary (`CART`, `WALK`, `WALK/RIDE`) in any
    /// case; anything unrecognized falls back to cart.
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "WALK" => Transport::Walk,
            "WALK/RIDE" | "WALK_RIDE" | "WALKRIDE" => Transport::WalkRide,
            _ => Transport::Cart,
        }
    }
}

/// One ranked, acceptable booking target.
///
/// Lower priority is tried first. Duplicates are legal; the list order is
/// the attempt order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    /// Rank within the preference list (1 = most wanted).
    pub priority: u32,
    /// Tee time label as shown on the tee sheet, e.g. "8:07".
    pub time: String,
    /// Starting hole.
    pub hole: u8,
    /// Holes to play (9 or 18).
    #[serde(default = "default_holes")]
    pub holes_to_play: u8,
    #[serde(default)]
    pub transport: Transport,
}

fn default_holes() -> u8 {
    18
}

/// Why a worker gave up on a preference, or on its whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Session could not be acquired or the login was refused.
    AuthenticationFailed,
    /// The tee sheet page could not be reached.
    NavigationFailed,
    /// The booking date control was not found.
    DateNotFound,
    /// The slot was already taken when the claim was attempted.
    Unavailable,
    /// The session faulted mid-claim.
    SessionFault,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::AuthenticationFailed => "authentication_failed",
            FailureReason::NavigationFailed => "navigation_failed",
            FailureReason::DateNotFound => "date_not_found",
            FailureReason::Unavailable => "unavailable",
            FailureReason::SessionFault => "session_fault",
        }
    }
}

/// A booked tee time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessRecord {
    /// Worker that made the booking.
    pub worker: u32,
    /// The preference that was claimed.
    pub preference: Preference,
    /// Companions attached to the booking.
    pub guests_added: u32,
}

/// A failed setup phase or claim attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Worker that hit the failure.
    pub worker: u32,
    /// The preference being attempted; absent for setup failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preference: Option<Preference>,
    pub reason: FailureReason,
}

/// Terminal status of a booking run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every requested slot was booked.
    Complete,
    /// Some, but not all, requested slots were booked.
    Partial,
    /// Nothing was booked.
    Failed,
    /// The run was rejected before any worker started.
    Error,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Complete => "complete",
            RunStatus::Partial => "partial",
            RunStatus::Failed => "failed",
            RunStatus::Error => "error",
        }
    }
}

/// Final aggregated outcome of a run, built from coordinator state only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub status: RunStatus,
    /// The slot count originally requested.
    pub requested: usize,
    pub booked_count: usize,
    pub booked: Vec<SuccessRecord>,
    pub failures: Vec<FailureRecord>,
    /// Set only for runs rejected before workers were spawned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Report {
    /// Report for a run rejected before any worker was spawned.
    pub fn rejected(requested: usize, reason: impl Into<String>) -> Self {
        Self {
            status: RunStatus::Error,
            requested,
            booked_count: 0,
            booked: Vec::new(),
            failures: Vec::new(),
            reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pref(priority: u32) -> Preference {
        Preference {
            priority,
            time: "8:07".to_string(),
            hole: 10,
            holes_to_play: 18,
            transport: Transport::Cart,
        }
    }

    #[test]
    fn test_transport_parse_lenient() {
        assert_eq!(Transport::parse_lenient("CART"), Transport::Cart);
        assert_eq!(Transport::parse_lenient("walk"), Transport::Walk);
        assert_eq!(Transport::parse_lenient("Walk/Ride"), Transport::WalkRide);
        assert_eq!(Transport::parse_lenient("hovercraft"), Transport::Cart);
        assert_eq!(Transport::parse_lenient("  WALK  "), Transport::Walk);
    }

    #[test]
    fn test_transport_serialization() {
        assert_eq!(
            serde_json::to_string(&Transport::WalkRide).unwrap(),
            "\"walk_ride\""
        );
        let parsed: Transport = serde_json::from_str("\"cart\"").unwrap();
        assert_eq!(parsed, Transport::Cart);
    }

    #[test]
    fn test_preference_defaults() {
        let parsed: Preference =
            toml::from_str("priority = 1\ntime = \"8:07\"\nhole = 10").unwrap();
        assert_eq!(parsed.holes_to_play, 18);
        assert_eq!(parsed.transport, Transport::Cart);
    }

    #[test]
    fn test_failure_reason_as_str() {
        assert_eq!(
            FailureReason::AuthenticationFailed.as_str(),
            "authentication_failed"
        );
        assert_eq!(FailureReason::Unavailable.as_str(), "unavailable");
    }

    #[test]
    fn test_setup_failure_omits_preference() {
        let record = FailureRecord {
            worker: 1,
            preference: None,
            reason: FailureReason::AuthenticationFailed,
        };
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("preference"));
    }

    #[test]
    fn test_rejected_report() {
        let report = Report::rejected(3, "no preferences configured");
        assert_eq!(report.status, RunStatus::Error);
        assert_eq!(report.requested, 3);
        assert_eq!(report.booked_count, 0);
        assert!(report.booked.is_empty());
        assert_eq!(report.reason.as_deref(), Some("no preferences configured"));
    }

    #[test]
    fn test_report_round_trip() {
        let report = Report {
            status: RunStatus::Partial,
            requested: 2,
            booked_count: 1,
            booked: vec![SuccessRecord {
                worker: 1,
                preference: pref(1),
                guests_added: 3,
            }],
            failures: vec![FailureRecord {
                worker: 2,
                preference: Some(pref(2)),
                reason: FailureReason::Unavailable,
            }],
            reason: None,
        };

        let json = serde_json::to_string(&report).unwrap();
        let parsed: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.status, RunStatus::Partial);
        assert_eq!(parsed.booked_count, 1);
        assert_eq!(parsed.failures[0].reason, FailureReason::Unavailable);
    }
}
