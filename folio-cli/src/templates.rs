//! Askama page templates for the HTTP surface.

use askama::Template;
use folio_core::listing::PostSummary;
use folio_core::MetaEntry;

/// Recent posts list
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub site_title: &'a str,
    pub posts: Vec<PostSummary>,

    // Page shell
    pub feed_path: &'a str,
    pub live: bool,
}

/// A single rendered record
#[derive(Template)]
#[template(path = "article.html")]
pub struct ArticleTemplate<'a> {
    pub title: &'a str,
    pub metadata: Vec<MetaEntry>,
    pub is_stale: bool,

    /// Rendered body HTML, inserted unescaped
    pub content: String,

    // Page shell
    pub feed_path: &'a str,
    pub live: bool,
}

/// 404 error page template
#[derive(Template)]
#[template(path = "404.html")]
pub struct NotFoundTemplate<'a> {
    pub path: &'a str,

    // Page shell
    pub feed_path: &'a str,
    pub live: bool,
}
