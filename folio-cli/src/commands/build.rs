//! Build command implementation.

use super::{feed_channel, load_config};
use anyhow::{Context, Result};
use chrono::Utc;
use folio_core::feed::generate_rss;
use folio_core::listing::all_posts;
use folio_core::provider::write_artifact;
use folio_core::url::route_table;
use folio_core::{Config, DiagnosticSeverity, Manifest, ManifestProvider, ARTIFACT_FILENAME};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Generate the manifest once and write every build artifact.
pub fn build_site(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    build_site_with_config(&config)
}

/// Build from an already loaded config.
pub fn build_site_with_config(config: &Config) -> Result<()> {
    tracing::info!("Building site: {}", config.site.title);

    let options = config.manifest_options();
    let provider = ManifestProvider::build(&options).context("Failed to generate manifest")?;
    let manifest = provider.manifest().context("Failed to generate manifest")?;

    report_diagnostics(&manifest);

    let output_dir = config.output_dir();
    fs::create_dir_all(&output_dir).context("Failed to create output directory")?;

    let artifact = output_dir.join(ARTIFACT_FILENAME);
    write_artifact(&manifest, &artifact)
        .with_context(|| format!("Failed to write {:?}", artifact))?;

    write_json(&output_dir.join("routes.json"), &route_table(&manifest))?;
    write_json(&output_dir.join("posts.json"), &all_posts(&manifest))?;

    let rss = generate_rss(&feed_channel(config), &manifest, Utc::now());
    fs::write(output_dir.join("rss.xml"), rss).context("Failed to write rss.xml")?;

    tracing::info!("✓ Generated {} records", manifest.len());
    tracing::info!("✓ Output written to {:?}", output_dir);

    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {:?}", path))?;
    fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
    tracing::debug!("Wrote {:?}", path);
    Ok(())
}

fn report_diagnostics(manifest: &Manifest) {
    let warnings = manifest
        .diagnostics
        .iter()
        .filter(|d| d.severity == DiagnosticSeverity::Warning)
        .count();
    if warnings > 0 {
        tracing::warn!("{} content problems; see warnings above", warnings);
    }
}
