//! Serve a built site from its manifest artifact, without rescanning content.

use super::{app_state, load_config, serve};
use anyhow::{Context, Result};
use folio_core::{ManifestProvider, ARTIFACT_FILENAME};
use std::path::Path;

pub async fn serve_site(config_path: &Path, port: Option<u16>) -> Result<()> {
    let config = load_config(config_path)?;
    let port = port.unwrap_or(config.server.port);

    let artifact = config.output_dir().join(ARTIFACT_FILENAME);
    let provider = ManifestProvider::from_artifact(&artifact).with_context(|| {
        format!(
            "Failed to load {:?}; run `folio build` first",
            artifact
        )
    })?;

    serve(app_state(&config, provider)?, port).await
}
