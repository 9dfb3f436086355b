//! One manifest, two delivery modes.
//!
//! A static provider serves a manifest generated once (or loaded from the
//! build artifact) and never re-scans. A live provider regenerates lazily on
//! first access after an invalidation. Both go through [`generate_manifest`],
//! so the records they hand out are identical for identical input bytes.

use crate::builder::{generate_manifest, ManifestError};
use crate::config::ManifestOptions;
use crate::models::{ContentFile, Manifest};
use crate::watch::ChangeKind;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// File name of the serialized manifest inside the output directory.
pub const ARTIFACT_FILENAME: &str = "content-manifest.json";

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid manifest artifact: {0}")]
    Json(#[from] serde_json::Error),
}

/// The export contract: `{ "files": [...] }`.
#[derive(Serialize, Deserialize)]
struct ManifestArtifact {
    files: Vec<ContentFile>,
}

/// Serialize a manifest to its artifact form (pretty JSON).
pub fn to_artifact_json(manifest: &Manifest) -> Result<String, ProviderError> {
    let artifact = ManifestArtifact {
        files: manifest.files.clone(),
    };
    Ok(serde_json::to_string_pretty(&artifact)?)
}

/// Write the artifact to `path`, creating parent directories.
pub fn write_artifact(manifest: &Manifest, path: &Path) -> Result<(), ProviderError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, to_artifact_json(manifest)?)?;
    tracing::debug!("Wrote manifest artifact to {}", path.display());
    Ok(())
}

/// Load a manifest from a previously written artifact.
pub fn read_artifact(path: &Path) -> Result<Manifest, ProviderError> {
    let data = fs::read(path)?;
    let artifact: ManifestArtifact = serde_json::from_slice(&data)?;
    Ok(Manifest::new(artifact.files))
}

enum Mode {
    Static(Arc<Manifest>),
    Live {
        options: ManifestOptions,
        cached: Mutex<Option<Arc<Manifest>>>,
    },
}

/// Hands out the current manifest to routes, listings and lookups.
pub struct ManifestProvider {
    mode: Mode,
    generation: AtomicU64,
}

impl ManifestProvider {
    /// Generate eagerly once; the result never changes.
    pub fn build(options: &ManifestOptions) -> Result<Self, ManifestError> {
        let manifest = generate_manifest(options)?;
        Ok(Self::from_manifest(manifest))
    }

    /// Serve a manifest loaded from the build artifact.
    pub fn from_artifact(path: &Path) -> Result<Self, ProviderError> {
        let manifest = read_artifact(path)?;
        tracing::info!(
            "Loaded {} records from {}",
            manifest.len(),
            path.display()
        );
        Ok(Self::from_manifest(manifest))
    }

    pub fn from_manifest(manifest: Manifest) -> Self {
        Self {
            mode: Mode::Static(Arc::new(manifest)),
            generation: AtomicU64::new(0),
        }
    }

    /// Regenerate lazily, after every invalidation.
    pub fn live(options: ManifestOptions) -> Self {
        Self {
            mode: Mode::Live {
                options,
                cached: Mutex::new(None),
            },
            generation: AtomicU64::new(0),
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self.mode, Mode::Live { .. })
    }

    /// Current manifest, generating it first if the cache is empty.
    ///
    /// Concurrent callers wait on the same generation instead of scanning twice.
    pub fn manifest(&self) -> Result<Arc<Manifest>, ManifestError> {
        match &self.mode {
            Mode::Static(manifest) => Ok(Arc::clone(manifest)),
            Mode::Live { options, cached } => {
                let mut cached = cached.lock();
                if let Some(manifest) = cached.as_ref() {
                    return Ok(Arc::clone(manifest));
                }
                let manifest = Arc::new(generate_manifest(options)?);
                *cached = Some(Arc::clone(&manifest));
                Ok(manifest)
            }
        }
    }

    /// Drop the cached manifest after a filesystem change.
    ///
    /// Structural changes (files added or removed) also advance the reload
    /// generation that clients poll to trigger a full reload. Returns whether
    /// anything was invalidated; static providers ignore changes.
    pub fn invalidate(&self, kind: ChangeKind) -> bool {
        let Mode::Live { cached, .. } = &self.mode else {
            return false;
        };

        cached.lock().take();
        if kind == ChangeKind::Structural {
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            tracing::info!("Content set changed; reload generation {}", generation);
        } else {
            tracing::debug!("Content changed; manifest will regenerate on next access");
        }
        true
    }

    /// Number of full reloads requested so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
