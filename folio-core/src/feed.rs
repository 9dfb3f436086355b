//! RSS 2.0 feed generation.

use crate::markdown::render_plain;
use crate::merge::parse_iso_date;
use crate::models::{ContentFile, Manifest};
use chrono::{DateTime, Utc};

/// Channel-level feed settings.
#[derive(Debug, Clone)]
pub struct FeedChannel {
    pub title: String,
    pub description: String,
    /// Absolute site URL; record URL paths are appended to it.
    pub site_url: String,
    /// Path the feed itself is served from, for the `atom:link` self reference.
    pub feed_path: String,
}

/// Render the feed: dated records only, newest first, bodies as HTML.
pub fn generate_rss(channel: &FeedChannel, manifest: &Manifest, now: DateTime<Utc>) -> String {
    let base = channel.site_url.trim_end_matches('/');

    let mut dated: Vec<(&ContentFile, DateTime<Utc>)> = manifest
        .files
        .iter()
        .filter_map(|f| {
            let date = f.attributes.date.as_deref().and_then(parse_iso_date)?;
            Some((f, date))
        })
        .collect();
    dated.sort_by(|a, b| b.1.cmp(&a.1));

    let mut items = String::new();
    for (file, date) in dated {
        let link = format!("{}{}", base, file.url_path);
        let attrs = &file.attributes;

        items.push_str("\n    <item>\n");
        items.push_str(&format!(
            "      <title>{}</title>\n",
            escape_xml(attrs.display_title())
        ));
        items.push_str(&format!(
            "      <description>{}</description>\n",
            escape_xml(attrs.description.as_deref().unwrap_or_default())
        ));
        items.push_str(&format!("      <link>{}</link>\n", escape_xml(&link)));
        items.push_str(&format!(
            "      <guid isPermaLink=\"true\">{}</guid>\n",
            escape_xml(&link)
        ));
        items.push_str(&format!("      <pubDate>{}</pubDate>\n", date.to_rfc2822()));
        if let Some(author) = attrs.author.as_deref() {
            items.push_str(&format!("      <author>{}</author>\n", escape_xml(author)));
        }
        items.push_str(&format!(
            "      <content:encoded>{}</content:encoded>\n",
            cdata(&render_plain(&file.raw_body))
        ));
        items.push_str("    </item>");
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom" xmlns:content="http://purl.org/rss/1.0/modules/content/">
  <channel>
    <title>{}</title>
    <description>{}</description>
    <link>{}</link>
    <atom:link href="{}{}" rel="self" type="application/rss+xml"/>
    <language>en-us</language>
    <lastBuildDate>{}</lastBuildDate>{}
  </channel>
</rss>
"#,
        escape_xml(&channel.title),
        escape_xml(&channel.description),
        escape_xml(base),
        escape_xml(base),
        escape_xml(&channel.feed_path),
        now.to_rfc2822(),
        items
    )
}

pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Wrap in a CDATA section, splitting any `]]>` inside the payload.
fn cdata(s: &str) -> String {
    format!("<![CDATA[{}]]>", s.replace("]]>", "]]]]><![CDATA[>"))
}
