//! Stream content change events as JSON lines.

use super::load_config;
use anyhow::{Context, Result};
use chrono::Utc;
use folio_core::watch::{classify, describe_event};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

pub async fn watch_changes(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let roots: Vec<PathBuf> = config
        .content_roots()
        .into_iter()
        .filter_map(|root| match fs::canonicalize(&root.path) {
            Ok(dir) if dir.is_dir() => Some(dir),
            _ => {
                tracing::warn!("Skipping missing content root {:?}", root.path);
                None
            }
        })
        .collect();

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut _watcher = RecommendedWatcher::new(
        move |res| {
            let _ = tx.send(res);
        },
        notify::Config::default(),
    )
    .context("Failed to initialize watcher")?;

    for root in &roots {
        _watcher
            .watch(root, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {:?}", root))?;
        eprintln!("Watching {:?} for changes (Ctrl+C to stop)...", root);
    }

    while let Some(event) = rx.recv().await {
        match event {
            Ok(ev) => {
                let Some(kind) = classify(&ev) else {
                    continue;
                };
                let event_type = describe_event(&ev.kind);
                for path in &ev.paths {
                    let rel = roots
                        .iter()
                        .find_map(|root| path.strip_prefix(root).ok())
                        .unwrap_or(path)
                        .to_string_lossy()
                        .replace('\\', "/");

                    let payload = json!({
                        "event": event_type,
                        "path": rel,
                        "kind": kind,
                        "timestamp": Utc::now().to_rfc3339(),
                    });
                    println!("{}", payload);
                }
            }
            Err(err) => eprintln!("Watcher error: {err}"),
        }
    }

    Ok(())
}
