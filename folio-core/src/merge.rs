//! Reconcile frontmatter with filename-derived identity.
//!
//! Frontmatter always wins. Filename values only fill the gaps: `slug` and
//! `publishedAt` when absent or empty, and `date` (synthesized from the
//! filename's calendar date) when the frontmatter has none.

use crate::filename::FilenameParts;
use crate::models::Attributes;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Frontmatter date '{0}' is not an ISO-8601 date")]
    InvalidDate(String),
}

/// Merge parsed frontmatter with the filename parts.
pub fn merge_attributes(
    mut frontmatter: Attributes,
    parts: &FilenameParts,
) -> Result<Attributes, MergeError> {
    frontmatter.slug = non_empty(frontmatter.slug).or_else(|| Some(parts.slug.clone()));
    frontmatter.published_at =
        non_empty(frontmatter.published_at).or_else(|| parts.published_at.clone());

    match non_empty(frontmatter.date.take()) {
        Some(date) => {
            if parse_iso_date(&date).is_none() {
                return Err(MergeError::InvalidDate(date));
            }
            frontmatter.date = Some(date);
        }
        None => frontmatter.date = parts.date.map(|d| synthesize_iso_date(&d)),
    }

    Ok(frontmatter)
}

/// Midnight UTC of a calendar date, e.g. `2024-03-05T00:00:00.000Z`.
pub fn synthesize_iso_date(date: &NaiveDate) -> String {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| date.format("%Y-%m-%d").to_string())
}

/// Parse an ISO-8601 date or date-time into a UTC instant.
///
/// Accepts RFC 3339 (`2024-03-05T10:00:00+01:00`), naive date-times
/// (`2024-03-05T10:00:00`, `2024-03-05 10:00`), YAML timestamps with a
/// spaced offset (`2024-03-05 10:00:00 +01:00`) and plain dates
/// (`2024-03-05`). Naive values are read as UTC.
pub fn parse_iso_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in [
        "%Y-%m-%d %H:%M:%S%.f %:z",
        "%Y-%m-%d %H:%M:%S%.f%:z",
        "%Y-%m-%dT%H:%M:%S%.f %:z",
    ] {
        if let Ok(dt) = DateTime::parse_from_str(input, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
