//! Parsing of the `created_at` column.

use crate::error::{ExportError, Result};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Naive layouts accepted for `created_at`, tried in order.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Time zone applied to timestamps that carry no offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeZoneMode {
    /// The machine's local zone, like `mktime`.
    #[default]
    Local,
    /// Coordinated Universal Time.
    Utc,
}

impl TimeZoneMode {
    /// Returns the mode as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Utc => "utc",
        }
    }
}

/// Parses a `created_at` value into an absolute point in time.
///
/// Accepts RFC 3339 with an explicit offset, `YYYY-MM-DD HH:MM:SS[.fff]`
/// (space or `T` separated) and a bare `YYYY-MM-DD` meaning midnight. Values
/// without an offset are read in `zone`.
pub fn parse_created_at(text: &str, zone: TimeZoneMode) -> Result<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(text) {
        return Ok(with_offset.with_timezone(&Utc));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| ExportError::parse(format!("invalid timestamp '{text}'")))?;

    resolve(naive, zone)
}

fn resolve(naive: NaiveDateTime, zone: TimeZoneMode) -> Result<DateTime<Utc>> {
    match zone {
        TimeZoneMode::Utc => Ok(Utc.from_utc_datetime(&naive)),
        // Ambiguous wall-clock times (DST fold) take the earlier instant.
        TimeZoneMode::Local => Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| {
                ExportError::parse(format!("timestamp '{naive}' does not exist in local time"))
            }),
    }
}
