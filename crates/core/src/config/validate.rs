use tracing::warn;

use super::{types::Config, ConfigError};

/// Validate a loaded configuration.
///
/// Catches the mistakes that would otherwise only surface mid-run, after
/// workers have already been spawned against a sheet that is about to open.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    config.booking.open_time()?;
    config.booking.utc_offset()?;
    config.booking.play_day()?;

    if config.session.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "session.url is not set".to_string(),
        ));
    }

    if config.preferences.is_empty() && config.sheet.is_none() {
        warn!("no preferences configured and no sheet to fetch them from");
    }

    for pref in &config.preferences {
        if pref.holes_to_play != 9 && pref.holes_to_play != 18 {
            return Err(ConfigError::ValidationError(format!(
                "preference {} has holes_to_play {} (expected 9 or 18)",
                pref.priority, pref.holes_to_play
            )));
        }
    }

    Ok(())
}
