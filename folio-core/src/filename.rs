//! Slug and date extraction from content filenames.
//!
//! Files may follow the `YYYY-MM-DD.<slug>.{md,mdx}` convention, in which case
//! the date prefix becomes the publication date. Anything else falls back to
//! the path minus its extension.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

static DATED_FILENAME_REGEX: OnceLock<Regex> = OnceLock::new();
static EXTENSION_REGEX: OnceLock<Regex> = OnceLock::new();

fn dated_filename_regex() -> &'static Regex {
    DATED_FILENAME_REGEX
        .get_or_init(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})\.(.+)\.mdx?$").expect("valid regex"))
}

fn extension_regex() -> &'static Regex {
    EXTENSION_REGEX.get_or_init(|| Regex::new(r"\.mdx?$").expect("valid regex"))
}

/// Identity derived from a filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameParts {
    pub slug: String,
    /// Calendar date from the filename prefix, if any.
    pub date: Option<NaiveDate>,
    /// The literal `YYYY-MM-DD` prefix, if any.
    pub published_at: Option<String>,
}

/// Parse a root-relative filename (segments joined with `/`).
///
/// The date pattern is matched against the last segment only; directory
/// segments are kept as a slug prefix.
///
/// # Example
///
/// ```
/// use folio_core::filename::parse_filename;
///
/// let parts = parse_filename("2024-03-05.my-post.mdx");
/// assert_eq!(parts.slug, "my-post");
/// assert_eq!(parts.published_at.as_deref(), Some("2024-03-05"));
///
/// let parts = parse_filename("guides/setup.md");
/// assert_eq!(parts.slug, "guides/setup");
/// assert!(parts.date.is_none());
/// ```
pub fn parse_filename(relative: &str) -> FilenameParts {
    let normalized = relative.replace('\\', "/");
    let (dir, name) = match normalized.rfind('/') {
        Some(idx) => (&normalized[..=idx], &normalized[idx + 1..]),
        None => ("", normalized.as_str()),
    };

    if let Some(captures) = dated_filename_regex().captures(name) {
        let (year, month, day) = (&captures[1], &captures[2], &captures[3]);
        let date = match (year.parse(), month.parse(), day.parse()) {
            (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d),
            _ => None,
        };

        if let Some(date) = date {
            return FilenameParts {
                slug: format!("{}{}", dir, &captures[4]),
                date: Some(date),
                published_at: Some(format!("{}-{}-{}", year, month, day)),
            };
        }

        tracing::debug!("Ignoring impossible date prefix in {}", relative);
    }

    FilenameParts {
        slug: strip_extension(&normalized),
        date: None,
        published_at: None,
    }
}

/// Remove a trailing `.md` / `.mdx` extension.
pub fn strip_extension(path: &str) -> String {
    extension_regex().replace(path, "").into_owned()
}

/// Whether a path names a content file.
pub fn is_content_file(name: &str) -> bool {
    name.ends_with(".md") || name.ends_with(".mdx")
}
