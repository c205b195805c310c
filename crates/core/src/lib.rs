pub mod archive;
pub mod booking;
pub mod config;
pub mod session;
pub mod testing;

pub use archive::{ArchiveError, FsRecordingSink, RecordingSink};
pub use booking::{
    next_play_date, BookingRunner, Coordinator, CoordinatorSnapshot, FailureReason, FailureRecord,
    Preference, ReleaseGate, Report, RunRequest, RunStatus, SuccessRecord, Transport, WorkQueue,
    Worker,
};
pub use config::{
    fetch_sheet_preferences, load_config, load_config_from_str, validate_config, ArchiveConfig,
    BookingConfig, Config, ConfigError, SessionConfig, SheetConfig,
};
pub use session::{
    ClaimOutcome, ClubhouseSession, ClubhouseSessionFactory, Session, SessionError, SessionFactory,
};
