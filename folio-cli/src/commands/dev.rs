//! Dev server: live manifest, debounced file watching, full reload on
//! structural changes.

use super::{app_state, load_config, serve};
use anyhow::{Context, Result};
use folio_core::watch::{classify, Debouncer};
use folio_core::{ManifestProvider, ManifestOptions};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Start development server with file watching
pub async fn dev_server(config_path: &Path, port: Option<u16>) -> Result<()> {
    let config = load_config(config_path)?;
    let port = port.unwrap_or(config.server.port);
    let options = config.manifest_options();

    let state = app_state(&config, ManifestProvider::live(options.clone()))?;

    // Generate once up front so configuration errors surface immediately.
    let manifest = state
        .provider
        .manifest()
        .context("Failed to generate manifest")?;
    tracing::info!("Serving {} records", manifest.len());

    let (tx, rx) = mpsc::unbounded_channel();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = tx.send(res);
        },
        notify::Config::default(),
    )
    .context("Failed to initialize file watcher")?;
    watch_roots(&mut watcher, &options)?;

    tokio::spawn(watch_loop(rx, Arc::clone(&state.provider)));

    serve(state, port).await
}

fn watch_roots(watcher: &mut RecommendedWatcher, options: &ManifestOptions) -> Result<()> {
    for root in &options.roots {
        if !root.path.is_dir() {
            tracing::warn!("Not watching missing content root {:?}", root.path);
            continue;
        }
        watcher
            .watch(&root.path, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {:?}", root.path))?;
        tracing::info!("Watching {:?} ({})", root.path, root.alias());
    }
    Ok(())
}

/// Coalesce watcher events and invalidate the provider once per burst.
async fn watch_loop(
    mut rx: mpsc::UnboundedReceiver<notify::Result<notify::Event>>,
    provider: Arc<ManifestProvider>,
) {
    let mut debouncer = Debouncer::new();

    loop {
        match tokio::time::timeout(debouncer.timeout(), rx.recv()).await {
            Ok(Some(Ok(event))) => {
                if let Some(kind) = classify(&event) {
                    tracing::debug!("{:?} change: {:?}", kind, event.paths);
                    debouncer.add(kind, event.paths);
                }
            }
            Ok(Some(Err(err))) => tracing::warn!("Watcher error: {}", err),
            Ok(None) => break,
            Err(_) => {}
        }

        if debouncer.ready() {
            if let Some((kind, paths)) = debouncer.take() {
                tracing::info!("{} files changed", paths.len());
                provider.invalidate(kind);
            }
        }
    }
}
