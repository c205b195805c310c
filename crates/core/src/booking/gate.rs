//! Wall-clock release gate aligning workers on the tee sheet open instant.

use chrono::{DateTime, Datelike, Duration as ChronoDuration, FixedOffset, NaiveDate, NaiveTime, Utc, Weekday};
use tracing::info;

/// Suspends a worker until the configured open instant.
///
/// Every worker waits on the same wall-clock instant independently; there
/// is no cross-worker handshake, so the skew between workers is whatever
/// the timer resolution gives us. The server-side tee sheet may itself lag
/// the instant, which is why callers refresh their date view after the
/// gate returns.
#[derive(Debug, Clone, Copy)]
pub struct ReleaseGate {
    open_at: DateTime<FixedOffset>,
}

impl ReleaseGate {
    pub fn new(open_at: DateTime<FixedOffset>) -> Self {
        Self { open_at }
    }

    /// Gate on today's date at `open` in the given fixed zone.
    ///
    /// This is the normal shape of a run: the job is started shortly before
    /// the sheet opens on booking morning.
    pub fn at_time_today(open: NaiveTime, zone: FixedOffset) -> Self {
        let today = Utc::now().with_timezone(&zone).date_naive();
        let open_at = today
            .and_time(open)
            .and_local_timezone(zone)
            .single()
            .expect("fixed offsets map local times uniquely");
        Self { open_at }
    }

    pub fn open_at(&self) -> DateTime<FixedOffset> {
        self.open_at
    }

    /// Suspend until the open instant, or return immediately if it has
    /// already passed. Returning is the signal to refresh the tee sheet
    /// view before competing.
    pub async fn wait_until_open(&self) {
        let now = Utc::now().with_timezone(self.open_at.offset());
        match self.open_at.signed_duration_since(now).to_std() {
            Ok(delay) if !delay.is_zero() => {
                info!(
                    open_at = %self.open_at,
                    delay_secs = format!("{:.1}", delay.as_secs_f64()),
                    "waiting for tee sheet to open"
                );
                tokio::time::sleep(delay).await;
                info!(open_at = %self.open_at, "tee sheet open");
            }
            _ => {
                info!(open_at = %self.open_at, "open instant already passed, proceeding");
            }
        }
    }
}

/// Next occurrence of `play_day` strictly after `base`.
pub fn next_play_date(base: NaiveDate, play_day: Weekday) -> NaiveDate {
    let ahead = (play_day.num_days_from_monday() as i64
        - base.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    let ahead = if ahead == 0 { 7 } else { ahead };
    base + ChronoDuration::days(ahead)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn eastern() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_until_future_instant() {
        let open_at = Utc::now().with_timezone(&eastern()) + ChronoDuration::seconds(2);
        let gate = ReleaseGate::new(open_at);

        let started = tokio::time::Instant::now();
        gate.wait_until_open().await;
        let waited = started.elapsed();

        assert!(
            waited >= Duration::from_millis(1900) && waited <= Duration::from_millis(2500),
            "expected ~2s suspension, got {:?}",
            waited
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_past_instant_returns_immediately() {
        let open_at = Utc::now().with_timezone(&eastern()) - ChronoDuration::seconds(5);
        let gate = ReleaseGate::new(open_at);

        let started = tokio::time::Instant::now();
        gate.wait_until_open().await;

        assert!(started.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn test_at_time_today_lands_on_today_in_zone() {
        let open = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
        let gate = ReleaseGate::at_time_today(open, eastern());

        let today = Utc::now().with_timezone(&eastern()).date_naive();
        assert_eq!(gate.open_at().date_naive(), today);
        assert_eq!(gate.open_at().time(), open);
    }

    #[test]
    fn test_next_play_date_strictly_after_base() {
        // 2025-12-08 is a Monday.
        let monday = NaiveDate::from_ymd_opt(2025, 12, 8).unwrap();
        assert_eq!(
            next_play_date(monday, Weekday::Sat),
            NaiveDate::from_ymd_opt(2025, 12, 13).unwrap()
        );

        // A Saturday base rolls a full week, never "today".
        let saturday = NaiveDate::from_ymd_opt(2025, 12, 13).unwrap();
        assert_eq!(
            next_play_date(saturday, Weekday::Sat),
            NaiveDate::from_ymd_opt(2025, 12, 20).unwrap()
        );
    }
}
