//! Remote preference sheet.
//!
//! Preferences live in a spreadsheet the household edits; a published CSV
//! export of it is fetched at run start. The sheet is advisory input, never
//! a hard dependency: fetch or parse trouble falls back to the inline
//! preferences, and malformed rows are skipped individually.

use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use super::{types::SheetConfig, ConfigError};
use crate::booking::{Preference, Transport};

/// One spreadsheet row, as exported: columns named like the sheet header.
#[derive(Debug, Deserialize)]
struct SheetRow {
    #[serde(rename = "Priority")]
    priority: u32,
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Hole")]
    hole: u8,
    #[serde(rename = "Holes to Play")]
    holes_to_play: u8,
    #[serde(rename = "Transport", default)]
    transport: Option<String>,
}

/// Fetch and parse the remote preference sheet.
pub async fn fetch_sheet_preferences(config: &SheetConfig) -> Result<Vec<Preference>, ConfigError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs as u64))
        .build()
        .map_err(|e| ConfigError::SheetError(e.to_string()))?;

    let response = client
        .get(&config.url)
        .send()
        .await
        .map_err(|e| ConfigError::SheetError(e.to_string()))?;

    if !response.status().is_success() {
        return Err(ConfigError::SheetError(format!(
            "HTTP {}",
            response.status()
        )));
    }

    let body = response
        .text()
        .await
        .map_err(|e| ConfigError::SheetError(e.to_string()))?;

    let preferences = parse_sheet(&body);
    info!(count = preferences.len(), "loaded preferences from sheet");
    Ok(preferences)
}

/// Parse CSV sheet content into a priority-sorted preference list.
///
/// Rows that fail to parse are skipped with a warning rather than failing
/// the whole sheet.
pub fn parse_sheet(csv_text: &str) -> Vec<Preference> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let mut preferences = Vec::new();
    for row in reader.deserialize::<SheetRow>() {
        match row {
            Ok(row) => preferences.push(Preference {
                priority: row.priority,
                time: row.time,
                hole: row.hole,
                holes_to_play: row.holes_to_play,
                transport: Transport::parse_lenient(row.transport.as_deref().unwrap_or("CART")),
            }),
            Err(e) => {
                warn!(error = %e, "skipping invalid sheet row");
            }
        }
    }

    preferences.sort_by_key(|p| p.priority);
    preferences
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "\
Priority,Time,Hole,Holes to Play,Transport
2,8:15,10,18,WALK
1,8:07,10,18,CART
3,8:23,1,9,WALK/RIDE
";

    #[test]
    fn test_parse_sheet_sorts_by_priority() {
        let prefs = parse_sheet(SHEET);
        assert_eq!(prefs.len(), 3);
        assert_eq!(prefs[0].priority, 1);
        assert_eq!(prefs[0].time, "8:07");
        assert_eq!(prefs[1].transport, Transport::Walk);
        assert_eq!(prefs[2].holes_to_play, 9);
        assert_eq!(prefs[2].transport, Transport::WalkRide);
    }

    #[test]
    fn test_invalid_rows_are_skipped() {
        let sheet = "\
Priority,Time,Hole,Holes to Play,Transport
1,8:07,10,18,CART
oops,not,a,row,
2,8:15,10,18,WALK
";
        let prefs = parse_sheet(sheet);
        assert_eq!(prefs.len(), 2);
        assert_eq!(prefs[0].priority, 1);
        assert_eq!(prefs[1].priority, 2);
    }

    #[test]
    fn test_unknown_transport_falls_back_to_cart() {
        let sheet = "\
Priority,Time,Hole,Holes to Play,Transport
1,8:07,10,18,SEGWAY
";
        let prefs = parse_sheet(sheet);
        assert_eq!(prefs[0].transport, Transport::Cart);
    }

    #[test]
    fn test_missing_transport_column_defaults_to_cart() {
        let sheet = "\
Priority,Time,Hole,Holes to Play
1,8:07,10,18
";
        let prefs = parse_sheet(sheet);
        assert_eq!(prefs.len(), 1);
        assert_eq!(prefs[0].transport, Transport::Cart);
    }

    #[test]
    fn test_empty_sheet_yields_no_preferences() {
        assert!(parse_sheet("Priority,Time,Hole,Holes to Play,Transport\n").is_empty());
        assert!(parse_sheet("").is_empty());
    }
}
