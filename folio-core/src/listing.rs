//! Presentation-layer views over the manifest: summaries, ordering and
//! per-article metadata. The manifest itself is never reordered.

use crate::merge::parse_iso_date;
use crate::models::{Attributes, ContentFile, Manifest, MetaEntry};
use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::Serialize;

/// Number of entries on the "recent posts" listing.
pub const RECENT_POSTS_LIMIT: usize = 10;

/// Articles at least this old are flagged as possibly outdated.
const STALE_AFTER_MONTHS: u32 = 3;

/// What index pages and the posts endpoint show for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub slug: String,
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

impl PostSummary {
    pub fn from_file(file: &ContentFile) -> Self {
        let attrs = &file.attributes;
        Self {
            slug: file.slug.clone(),
            url: file.url_path.clone(),
            title: attrs.display_title().to_string(),
            description: attrs.description.clone(),
            date: attrs.date.as_deref().and_then(parse_iso_date),
            tags: attrs.tags.clone().unwrap_or_default(),
        }
    }
}

/// Instant used for ordering: `date`, else `publishedAt`, else the epoch.
pub fn sort_key(attrs: &Attributes) -> DateTime<Utc> {
    attrs
        .date
        .as_deref()
        .and_then(parse_iso_date)
        .or_else(|| attrs.published_at.as_deref().and_then(parse_iso_date))
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Stable sort, newest first. Ties keep manifest order.
pub fn sort_newest_first(files: &mut [&ContentFile]) {
    files.sort_by(|a, b| sort_key(&b.attributes).cmp(&sort_key(&a.attributes)));
}

/// All records as summaries, newest first.
pub fn all_posts(manifest: &Manifest) -> Vec<PostSummary> {
    let mut files: Vec<&ContentFile> = manifest.files.iter().collect();
    sort_newest_first(&mut files);
    files.into_iter().map(PostSummary::from_file).collect()
}

/// Dated records only, newest first, at most `limit`.
pub fn recent_posts(manifest: &Manifest, limit: usize) -> Vec<PostSummary> {
    let mut dated: Vec<&ContentFile> = manifest
        .files
        .iter()
        .filter(|f| f.attributes.date.as_deref().and_then(parse_iso_date).is_some())
        .collect();
    sort_newest_first(&mut dated);
    dated
        .into_iter()
        .take(limit)
        .map(PostSummary::from_file)
        .collect()
}

/// Metadata table shown above an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleMetadata {
    pub entries: Vec<MetaEntry>,
    pub is_stale: bool,
}

/// The record's `data` entries, prefixed with a `Last Updated` row when the
/// record has a date.
pub fn article_metadata(attrs: &Attributes, today: NaiveDate) -> ArticleMetadata {
    let entries = attrs.data.clone().unwrap_or_default();

    let Some(date) = attrs.date.as_deref().and_then(parse_iso_date) else {
        return ArticleMetadata {
            entries,
            is_stale: false,
        };
    };

    let date = date.date_naive();
    let mut with_date = Vec::with_capacity(entries.len() + 1);
    with_date.push(MetaEntry::new(
        "Last Updated",
        date.format("%d/%m/%Y").to_string(),
    ));
    with_date.extend(entries);

    let is_stale = date
        .checked_add_months(Months::new(STALE_AFTER_MONTHS))
        .is_some_and(|threshold| threshold <= today);

    ArticleMetadata {
        entries: with_date,
        is_stale,
    }
}
