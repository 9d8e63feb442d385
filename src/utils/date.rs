//! Timestamp normalization for `<lastmod>` values.
//!
//! The backend returns `timestamptz` columns in several shapes depending on
//! column type and driver. Everything is normalized to UTC and rendered with
//! millisecond precision, e.g. `2024-01-15T10:00:00.000Z`.

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Rendering format for URL `<lastmod>` values.
const LASTMOD_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Rendering format for sitemap index `<lastmod>` values.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a backend timestamp into UTC.
///
/// Accepted shapes:
/// - RFC 3339 with any offset (`2024-01-15T10:00:00+02:00`, `...Z`)
/// - Postgres text output with a short offset (`2024-01-15 10:00:00.5+00`)
/// - naive date-time, taken as UTC (`2024-01-15T10:00:00`)
/// - plain date, taken as midnight UTC (`2024-01-15`)
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT)
        && let Some(naive) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(naive.and_utc());
    }

    bail!("unrecognized timestamp `{s}`")
}

/// Render a URL `<lastmod>` value.
pub fn format_lastmod(dt: &DateTime<Utc>) -> String {
    dt.format(LASTMOD_FORMAT).to_string()
}

/// Render a calendar date (`YYYY-MM-DD`).
pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Today's date in UTC.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
