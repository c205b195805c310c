mod loader;
mod sheet;
mod types;
mod validate;

pub use loader::{load_config, load_config_from_str};
pub use sheet::{fetch_sheet_preferences, parse_sheet};
pub use types::{ArchiveConfig, BookingConfig, Config, SessionConfig, SheetConfig};
pub use validate::validate_config;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),

    #[error("Preference sheet unavailable: {0}")]
    SheetError(String),
}
