use std::path::PathBuf;

use chrono::{FixedOffset, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::booking::{Preference, Transport};

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub session: SessionConfig,
    /// Optional remote preference sheet; when set and reachable, its rows
    /// replace the inline preferences below.
    #[serde(default)]
    pub sheet: Option<SheetConfig>,
    /// Optional recording archive; absence disables archiving.
    #[serde(default)]
    pub archive: Option<ArchiveConfig>,
    /// Inline preference list, in priority order.
    #[serde(default)]
    pub preferences: Vec<Preference>,
}

impl Config {
    /// Built-in fallback used when no usable configuration can be obtained.
    /// A run is never aborted for configuration reasons.
    pub fn fallback() -> Self {
        Self {
            booking: BookingConfig::default(),
            session: SessionConfig::default(),
            sheet: None,
            archive: None,
            preferences: vec![Preference {
                priority: 1,
                time: "8:07".to_string(),
                hole: 10,
                holes_to_play: 18,
                transport: Transport::Cart,
            }],
        }
    }
}

/// Booking run configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BookingConfig {
    /// How many tee times to book.
    #[serde(default = "default_slots")]
    pub slots_to_book: usize,
    /// When the tee sheet opens, local to `utc_offset`, "HH:MM".
    #[serde(default = "default_open_time")]
    pub open_time: String,
    /// Fixed UTC offset of the club's clock, e.g. "-05:00".
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
    /// Day of week being booked; the run targets its next occurrence.
    #[serde(default = "default_play_day")]
    pub play_day: String,
    /// How long to wait for workers before abandoning them.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
    /// Pause after the post-open refresh (milliseconds).
    #[serde(default = "default_refresh_settle_ms")]
    pub refresh_settle_ms: u64,
}

impl BookingConfig {
    /// Parsed open time.
    pub fn open_time(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::parse_from_str(&self.open_time, "%H:%M").map_err(|e| {
            ConfigError::ValidationError(format!(
                "open_time {:?} is not HH:MM: {}",
                self.open_time, e
            ))
        })
    }

    /// Parsed UTC offset.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.utc_offset.parse::<FixedOffset>().map_err(|e| {
            ConfigError::ValidationError(format!(
                "utc_offset {:?} is not an offset like -05:00: {}",
                self.utc_offset, e
            ))
        })
    }

    /// Parsed play day.
    pub fn play_day(&self) -> Result<Weekday, ConfigError> {
        self.play_day.parse::<Weekday>().map_err(|_| {
            ConfigError::ValidationError(format!(
                "play_day {:?} is not a weekday name",
                self.play_day
            ))
        })
    }
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            slots_to_book: default_slots(),
            open_time: default_open_time(),
            utc_offset: default_utc_offset(),
            play_day: default_play_day(),
            deadline_secs: default_deadline_secs(),
            refresh_settle_ms: default_refresh_settle_ms(),
        }
    }
}

fn default_slots() -> usize {
    1
}

fn default_open_time() -> String {
    "06:00".to_string()
}

fn default_utc_offset() -> String {
    // Eastern standard time, the original club's clock.
    "-05:00".to_string()
}

fn default_play_day() -> String {
    "saturday".to_string()
}

fn default_deadline_secs() -> u64 {
    160
}

fn default_refresh_settle_ms() -> u64 {
    2000
}

/// Member portal session configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Member portal URL (e.g. "https://club.example.com/Member-Central").
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Record an action transcript per session.
    #[serde(default)]
    pub record: bool,
    /// Where session transcripts are written before archiving.
    #[serde(default = "default_record_dir")]
    pub record_dir: PathBuf,
    /// Name filled in for each companion slot.
    #[serde(default = "default_guest_name")]
    pub guest_name: String,
    /// Companions to attach per booking.
    #[serde(default = "default_guest_count")]
    pub guest_count: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: String::new(),
            timeout_secs: default_timeout(),
            record: false,
            record_dir: default_record_dir(),
            guest_name: default_guest_name(),
            guest_count: default_guest_count(),
        }
    }
}

fn default_timeout() -> u32 {
    30
}

fn default_record_dir() -> PathBuf {
    PathBuf::from("recordings")
}

fn default_guest_name() -> String {
    "Guest, TBD".to_string()
}

fn default_guest_count() -> u32 {
    3
}

/// Remote preference sheet configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SheetConfig {
    /// CSV export URL of the preference sheet.
    pub url: String,
    /// Fetch timeout in seconds (default: 10)
    #[serde(default = "default_sheet_timeout")]
    pub timeout_secs: u32,
}

fn default_sheet_timeout() -> u32 {
    10
}

/// Recording archive configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArchiveConfig {
    /// Root directory recordings are archived under, keyed by date.
    pub dir: PathBuf,
}
