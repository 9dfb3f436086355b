//! List manifest records, optionally restricted to some content roots.

use super::load_config;
use anyhow::{Context, Result};
use folio_core::listing::{sort_newest_first, PostSummary};
use folio_core::{generate_manifest, LookupService};
use std::path::Path;

pub fn list_content(config_path: &Path, roots: &[String], json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let options = config.manifest_options();
    let manifest = generate_manifest(&options).context("Failed to generate manifest")?;

    let lookup = LookupService::new(&manifest);
    let mut files = lookup.list_roots(&options, roots)?;
    sort_newest_first(&mut files);

    if json {
        let summaries: Vec<PostSummary> = files.into_iter().map(PostSummary::from_file).collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if files.is_empty() {
        println!("No content found.");
        return Ok(());
    }

    for file in files {
        let date = file
            .attributes
            .published_at
            .as_deref()
            .unwrap_or("----------");
        println!(
            "{}  {}  {}",
            date,
            file.url_path,
            file.attributes.display_title()
        );
    }

    Ok(())
}
