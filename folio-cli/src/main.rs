//! # folio CLI
//!
//! Command-line interface for the folio content pipeline.

mod commands;
mod server;
mod templates;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "folio.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the manifest and write build artifacts
    Build,

    /// Start development server with live reload
    Dev {
        /// Server port (defaults to the configured port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Serve a built site from its manifest artifact
    Serve {
        /// Server port (defaults to the configured port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// List content records, newest first
    List {
        /// Restrict to content roots by alias (repeatable)
        #[arg(long = "root")]
        roots: Vec<String>,

        /// Return JSON for machine consumption
        #[arg(long)]
        json: bool,
    },

    /// Show the record served at a URL path
    Show {
        /// URL path, e.g. /my-post
        url_path: String,
    },

    /// Stream content change events as JSON lines
    Watch,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays clean.
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Build => commands::build_site(&cli.config),
        Commands::Dev { port } => commands::dev_server(&cli.config, port).await,
        Commands::Serve { port } => commands::serve_site(&cli.config, port).await,
        Commands::List { roots, json } => commands::list_content(&cli.config, &roots, json),
        Commands::Show { url_path } => commands::show_content(&cli.config, &url_path),
        Commands::Watch => commands::watch_changes(&cli.config).await,
    }
}
