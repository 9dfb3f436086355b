//! Canonical route derivation and the route table.

use crate::config::ContentRoot;
use crate::models::Manifest;
use serde::{Deserialize, Serialize};

/// Canonical URL path for a slug under a content root.
///
/// The primary root sits at top-level routes (`/<slug>`); every other root is
/// prefixed with its alias (`/<alias>/<slug>`).
///
/// ```
/// use folio_core::config::ContentRoot;
/// use folio_core::url::url_path;
///
/// let posts = ContentRoot::new("posts");
/// let notes = ContentRoot::with_alias("content/notes", "journal");
///
/// assert_eq!(url_path("my-post", &posts, "posts"), "/my-post");
/// assert_eq!(url_path("day-one", &notes, "posts"), "/journal/day-one");
/// ```
pub fn url_path(slug: &str, root: &ContentRoot, primary: &str) -> String {
    let slug = slug.trim_matches('/');
    if root.is_primary(primary) {
        format!("/{}", slug)
    } else {
        format!("/{}/{}", root.alias().trim_matches('/'), slug)
    }
}

/// One generated route: the URL pattern and a stable route id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub path: String,
    pub id: String,
}

/// Route table consumed by the route generator: one entry per record.
pub fn route_table(manifest: &Manifest) -> Vec<RouteEntry> {
    manifest
        .files
        .iter()
        .map(|file| RouteEntry {
            path: file.url_path.clone(),
            id: file.slug.clone(),
        })
        .collect()
}
