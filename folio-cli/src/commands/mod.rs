//! CLI command implementations.

pub mod build;
pub mod dev;
pub mod list;
pub mod serve;
pub mod show;
pub mod watch;

pub use build::build_site;
pub use dev::dev_server;
pub use list::list_content;
pub use serve::serve_site;
pub use show::show_content;
pub use watch::watch_changes;

use crate::server::{AppState, FEED_PATH};
use anyhow::{Context, Result};
use folio_core::feed::FeedChannel;
use folio_core::markdown::SyntectHighlighter;
use folio_core::{Config, ManifestProvider};
use std::path::Path;
use std::sync::Arc;

/// Load the config file, falling back to defaults when it does not exist.
pub fn load_config(config_path: &Path) -> Result<Config> {
    if !config_path.exists() {
        tracing::warn!(
            "No config file at {:?}; using defaults (content root: posts)",
            config_path
        );
        return Ok(Config::default());
    }

    tracing::debug!("Loading config from {:?}", config_path);
    Config::from_file(config_path).context("Failed to load configuration")
}

pub fn feed_channel(config: &Config) -> FeedChannel {
    FeedChannel {
        title: config.site.title.clone(),
        description: config.site.description.clone(),
        site_url: config.site.url.clone(),
        feed_path: FEED_PATH.to_string(),
    }
}

/// Shared server state for a provider built from this config.
pub fn app_state(config: &Config, provider: ManifestProvider) -> Result<AppState> {
    let highlighter = SyntectHighlighter::new(&config.highlight.theme)
        .context("Failed to initialize syntax highlighter")?;

    Ok(AppState {
        provider: Arc::new(provider),
        highlighter: Arc::new(highlighter),
        channel: Arc::new(feed_channel(config)),
    })
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, port: u16) -> Result<()> {
    let app = crate::server::router(state);

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("\nServing at http://localhost:{}", port);
    println!("   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
