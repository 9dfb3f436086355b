//! # folio-core
//!
//! Content manifest and resolution pipeline for Markdown/MDX sites.
//!
//! This crate turns directory trees of content files into an ordered
//! [`Manifest`] of records with stable slugs and canonical URLs, serves that
//! manifest identically from a build artifact or a live rescan, resolves URL
//! paths against it, and pre-highlights code blocks for rendering.

pub mod builder;
pub mod config;
pub mod feed;
pub mod filename;
pub mod frontmatter;
pub mod listing;
pub mod lookup;
pub mod markdown;
pub mod merge;
pub mod models;
pub mod provider;
pub mod url;
pub mod watch;

pub use builder::{generate_manifest, ManifestBuilder, ManifestError};
pub use config::{Config, ContentRoot, DuplicatePolicy, ManifestOptions};
pub use lookup::{LookupError, LookupService};
pub use markdown::{render_post, RenderedPost};
pub use models::{Attributes, ContentFile, Diagnostic, DiagnosticSeverity, Manifest, MetaEntry};
pub use provider::{ManifestProvider, ProviderError, ARTIFACT_FILENAME};
pub use watch::ChangeKind;
