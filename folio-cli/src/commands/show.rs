//! Resolve one URL path and print its record.

use super::load_config;
use anyhow::{bail, Context, Result};
use folio_core::{generate_manifest, LookupService};
use std::path::Path;

pub fn show_content(config_path: &Path, url_path: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let manifest =
        generate_manifest(&config.manifest_options()).context("Failed to generate manifest")?;

    let lookup = LookupService::new(&manifest);
    let Some(file) = lookup.get_by_url_path(url_path) else {
        bail!("No content at {}", url_path);
    };

    println!("{}", serde_json::to_string_pretty(file)?);
    Ok(())
}
