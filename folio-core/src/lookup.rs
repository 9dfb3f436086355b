//! URL path resolution and listing over a manifest.
//!
//! Lookups never sort; ordering is whatever the manifest has.

use crate::config::ManifestOptions;
use crate::models::{ContentFile, Manifest};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LookupError {
    #[error("Unknown content root: {0}")]
    UnknownRoot(String),
}

/// Read-only query view over one manifest.
pub struct LookupService<'a> {
    manifest: &'a Manifest,
    by_url: HashMap<&'a str, usize>,
}

impl<'a> LookupService<'a> {
    pub fn new(manifest: &'a Manifest) -> Self {
        let mut by_url = HashMap::with_capacity(manifest.len());
        for (idx, file) in manifest.files.iter().enumerate() {
            by_url.entry(file.url_path.as_str()).or_insert(idx);
        }
        Self { manifest, by_url }
    }

    /// Exact match, then one more try with a single trailing slash removed.
    ///
    /// ```
    /// use folio_core::lookup::LookupService;
    /// use folio_core::models::{Attributes, ContentFile, Manifest};
    ///
    /// let manifest = Manifest::new(vec![ContentFile {
    ///     path: "/site/posts/my-post.md".into(),
    ///     slug: "my-post".into(),
    ///     url_path: "/my-post".into(),
    ///     attributes: Attributes::default(),
    ///     raw_body: String::new(),
    /// }]);
    /// let lookup = LookupService::new(&manifest);
    ///
    /// assert!(lookup.get_by_url_path("/my-post/").is_some());
    /// assert!(lookup.get_by_url_path("/nope").is_none());
    /// ```
    pub fn get_by_url_path(&self, path: &str) -> Option<&'a ContentFile> {
        let manifest = self.manifest;
        let find = |p: &str| self.by_url.get(p).map(|&idx| &manifest.files[idx]);

        find(path).or_else(|| path.strip_suffix('/').and_then(find))
    }

    /// All records, optionally limited to those under the given aliases.
    ///
    /// A record matches an alias when its URL starts with `/<alias>/`, so
    /// records of the primary root are never matched by an alias filter.
    pub fn list_all(&self, aliases: Option<&[String]>) -> Vec<&'a ContentFile> {
        match aliases {
            None => self.manifest.files.iter().collect(),
            Some(aliases) => {
                let prefixes: Vec<String> = aliases
                    .iter()
                    .map(|a| format!("/{}/", a.trim_matches('/')))
                    .collect();
                self.manifest
                    .files
                    .iter()
                    .filter(|f| prefixes.iter().any(|p| f.url_path.starts_with(p.as_str())))
                    .collect()
            }
        }
    }

    /// Like [`list_all`](Self::list_all), but rejects aliases that name no
    /// configured root.
    pub fn list_roots(
        &self,
        options: &ManifestOptions,
        aliases: &[String],
    ) -> Result<Vec<&'a ContentFile>, LookupError> {
        if aliases.is_empty() {
            return Ok(self.list_all(None));
        }

        let known = options.aliases();
        if let Some(unknown) = aliases.iter().find(|a| !known.contains(&a.as_str())) {
            return Err(LookupError::UnknownRoot(unknown.clone()));
        }

        Ok(self.list_all(Some(aliases)))
    }
}
