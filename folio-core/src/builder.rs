//! Manifest generation - discovers content files and turns them into records.

use crate::{
    config::{ContentRoot, DuplicatePolicy, ManifestOptions},
    filename::{is_content_file, parse_filename},
    frontmatter::{parse_frontmatter, FrontmatterError},
    merge::{merge_attributes, MergeError},
    models::*,
    url::url_path,
};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Errors that abort a whole generation pass.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("No content roots configured")]
    NoContentRoots,

    #[error("Duplicate slug: {0}")]
    DuplicateSlug(String),

    #[error("Duplicate URL path: {0}")]
    DuplicateUrl(String),
}

/// Errors confined to a single content file.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),

    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),
}

impl FileError {
    fn code(&self) -> &'static str {
        match self {
            FileError::Io(_) => "file.io",
            FileError::Frontmatter(_) => "file.frontmatter",
            FileError::Merge(_) => "file.merge",
        }
    }
}

/// Builds a [`Manifest`] from the configured content roots.
pub struct ManifestBuilder<'a> {
    options: &'a ManifestOptions,
}

impl<'a> ManifestBuilder<'a> {
    pub fn new(options: &'a ManifestOptions) -> Self {
        Self { options }
    }

    /// Scan every root and assemble the manifest.
    ///
    /// Files that fail to process are excluded and reported as diagnostics;
    /// only configuration problems (and duplicate slugs or URL paths under
    /// [`DuplicatePolicy::Error`]) abort the pass.
    pub fn build(&self) -> Result<Manifest, ManifestError> {
        if self.options.roots.is_empty() {
            return Err(ManifestError::NoContentRoots);
        }

        let mut files: Vec<ContentFile> = Vec::new();
        let mut slugs: HashSet<String> = HashSet::new();
        let mut urls: HashSet<String> = HashSet::new();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();

        for root in &self.options.roots {
            let Some(root_dir) = self.resolve_root(root, &mut diagnostics) else {
                continue;
            };

            let discovered = discover_content_files(&root_dir);
            tracing::debug!(
                "Found {} content files under {}",
                discovered.len(),
                root_dir.display()
            );

            for file_path in discovered {
                let file = match self.process_file(root, &root_dir, &file_path) {
                    Ok(file) => file,
                    Err(e) => {
                        tracing::warn!("Skipping {}: {}", file_path.display(), e);
                        diagnostics.push(Diagnostic::warning(
                            e.code(),
                            e.to_string(),
                            Some(file_path.clone()),
                        ));
                        continue;
                    }
                };

                let clash = if slugs.contains(&file.slug) {
                    Some(Clash::Slug)
                } else if urls.contains(&file.url_path) {
                    Some(Clash::Url)
                } else {
                    None
                };

                if let Some(clash) = clash {
                    match self.options.duplicates {
                        DuplicatePolicy::Error => {
                            tracing::warn!("Duplicate {}: {}", clash.label(), clash.key(&file));
                            return Err(clash.into_error(file));
                        }
                        DuplicatePolicy::FirstWins => {
                            tracing::warn!(
                                "Duplicate {} '{}': keeping earlier file, excluding {}",
                                clash.label(),
                                clash.key(&file),
                                file.path.display()
                            );
                            diagnostics.push(duplicate_diagnostic(clash, &file));
                            continue;
                        }
                        DuplicatePolicy::LastWins => {
                            let (losers, kept): (Vec<ContentFile>, Vec<ContentFile>) =
                                std::mem::take(&mut files).into_iter().partition(|f| {
                                    f.slug == file.slug || f.url_path == file.url_path
                                });
                            files = kept;
                            for loser in losers {
                                let clash = if loser.slug == file.slug {
                                    Clash::Slug
                                } else {
                                    Clash::Url
                                };
                                tracing::warn!(
                                    "Duplicate {} '{}': excluding earlier file {}",
                                    clash.label(),
                                    clash.key(&loser),
                                    loser.path.display()
                                );
                                slugs.remove(&loser.slug);
                                urls.remove(&loser.url_path);
                                diagnostics.push(duplicate_diagnostic(clash, &loser));
                            }
                        }
                    }
                }

                slugs.insert(file.slug.clone());
                urls.insert(file.url_path.clone());
                files.push(file);
            }
        }

        tracing::info!(
            "Generated manifest with {} files ({} diagnostics)",
            files.len(),
            diagnostics.len()
        );

        Ok(Manifest { files, diagnostics })
    }

    /// Absolute root directory, or `None` when it does not exist.
    fn resolve_root(&self, root: &ContentRoot, diagnostics: &mut Vec<Diagnostic>) -> Option<PathBuf> {
        match fs::canonicalize(&root.path) {
            Ok(dir) if dir.is_dir() => Some(dir),
            Ok(dir) => {
                tracing::warn!("Content root {} is not a directory", dir.display());
                diagnostics.push(Diagnostic::warning(
                    "root.not-a-directory",
                    format!("Content root '{}' is not a directory", root.alias()),
                    Some(dir),
                ));
                None
            }
            Err(_) => {
                tracing::warn!(
                    "Content root {} does not exist; treating it as empty",
                    root.path.display()
                );
                diagnostics.push(Diagnostic::warning(
                    "root.missing",
                    format!("Content root '{}' does not exist", root.alias()),
                    Some(root.path.clone()),
                ));
                None
            }
        }
    }

    /// Read, extract, merge and route a single file.
    fn process_file(
        &self,
        root: &ContentRoot,
        root_dir: &Path,
        path: &Path,
    ) -> Result<ContentFile, FileError> {
        let content = fs::read_to_string(path)?;
        let (frontmatter, body) = parse_frontmatter(&content)?;

        let relative = relative_name(root_dir, path);
        let parts = parse_filename(&relative);
        let attributes = merge_attributes(frontmatter, &parts)?;

        let slug = attributes
            .slug
            .clone()
            .unwrap_or_else(|| parts.slug.clone());
        let url_path = url_path(&slug, root, &self.options.primary);

        Ok(ContentFile {
            path: path.to_path_buf(),
            slug,
            url_path,
            attributes,
            raw_body: body,
        })
    }
}

/// Generate a manifest for the given options.
pub fn generate_manifest(options: &ManifestOptions) -> Result<Manifest, ManifestError> {
    ManifestBuilder::new(options).build()
}

/// Recursively discover `.md`/`.mdx` files in file-name order.
fn discover_content_files(root_dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(root_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!("Failed to read directory entry: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_str().is_some_and(is_content_file))
        .map(DirEntry::into_path)
        .collect()
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

/// Root-relative path with segments joined by `/`.
fn relative_name(root_dir: &Path, path: &Path) -> String {
    path.strip_prefix(root_dir)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Which identity two records share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clash {
    Slug,
    Url,
}

impl Clash {
    fn label(self) -> &'static str {
        match self {
            Clash::Slug => "slug",
            Clash::Url => "URL path",
        }
    }

    fn key(self, file: &ContentFile) -> &str {
        match self {
            Clash::Slug => &file.slug,
            Clash::Url => &file.url_path,
        }
    }

    fn into_error(self, file: ContentFile) -> ManifestError {
        match self {
            Clash::Slug => ManifestError::DuplicateSlug(file.slug),
            Clash::Url => ManifestError::DuplicateUrl(file.url_path),
        }
    }
}

fn duplicate_diagnostic(clash: Clash, file: &ContentFile) -> Diagnostic {
    let code = match clash {
        Clash::Slug => "duplicate-slug",
        Clash::Url => "duplicate-url",
    };
    Diagnostic::warning(
        code,
        format!(
            "{} '{}' is already taken; file excluded",
            clash.label(),
            clash.key(file)
        ),
        Some(file.path.clone()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_no_roots_is_fatal() {
        let options = ManifestOptions::new(Vec::new());
        assert!(matches!(
            generate_manifest(&options),
            Err(ManifestError::NoContentRoots)
        ));
    }

    #[test]
    fn test_discovery_is_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        write(dir.path(), "b.md", "B");
        write(dir.path(), "a.mdx", "A");
        write(dir.path(), "notes.txt", "ignored");
        write(dir.path(), ".drafts/hidden.md", "ignored");
        write(dir.path(), "nested/c.md", "C");

        let root = fs::canonicalize(dir.path()).unwrap();
        let names: Vec<String> = discover_content_files(&root)
            .iter()
            .map(|p| relative_name(&root, p))
            .collect();
        assert_eq!(names, vec!["a.mdx", "b.md", "nested/c.md"]);
    }

    #[test]
    fn test_record_shape() {
        let dir = tempdir().unwrap();
        let posts = dir.path().join("posts");
        write(&posts, "2024-03-05.my-post.mdx", "---\ntitle: Hello\n---\nBody\n");

        let options = ManifestOptions::new(vec![ContentRoot::new(&posts)]);
        let manifest = generate_manifest(&options).unwrap();

        assert_eq!(manifest.len(), 1);
        let file = &manifest.files[0];
        assert_eq!(file.slug, "my-post");
        assert_eq!(file.url_path, "/my-post");
        assert_eq!(file.raw_body, "Body\n");
        assert!(file.path.is_absolute());
        assert_eq!(file.attributes.title.as_deref(), Some("Hello"));
        assert_eq!(file.attributes.published_at.as_deref(), Some("2024-03-05"));
    }

    #[test]
    fn test_frontmatter_slug_drives_url() {
        let dir = tempdir().unwrap();
        let posts = dir.path().join("posts");
        write(&posts, "draft.md", "---\nslug: final-name\n---\n");

        let options = ManifestOptions::new(vec![ContentRoot::new(&posts)]);
        let manifest = generate_manifest(&options).unwrap();
        assert_eq!(manifest.files[0].slug, "final-name");
        assert_eq!(manifest.files[0].url_path, "/final-name");
    }

    #[test]
    fn test_bad_file_is_excluded_with_diagnostic() {
        let dir = tempdir().unwrap();
        let posts = dir.path().join("posts");
        write(&posts, "good.md", "---\ntitle: Good\n---\n");
        write(&posts, "bad.md", "---\ntitle: [unclosed\n---\n");
        write(&posts, "baddate.md", "---\ndate: someday\n---\n");

        let options = ManifestOptions::new(vec![ContentRoot::new(&posts)]);
        let manifest = generate_manifest(&options).unwrap();

        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.files[0].slug, "good");
        let codes: Vec<&str> = manifest.diagnostics.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["file.frontmatter", "file.merge"]);
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = tempdir().unwrap();
        let posts = dir.path().join("posts");
        write(&posts, "hello.md", "Hi");

        let options = ManifestOptions::new(vec![
            ContentRoot::new(&posts),
            ContentRoot::new(dir.path().join("nowhere")),
        ]);
        let manifest = generate_manifest(&options).unwrap();
        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.diagnostics[0].code, "root.missing");
    }

    #[test]
    fn test_duplicate_policies() {
        let dir = tempdir().unwrap();
        let posts = dir.path().join("posts");
        write(&posts, "a.md", "---\nslug: same\ntitle: A\n---\n");
        write(&posts, "b.md", "---\nslug: same\ntitle: B\n---\n");
        let roots = vec![ContentRoot::new(&posts)];

        let first = generate_manifest(&ManifestOptions::new(roots.clone())).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first.files[0].attributes.title.as_deref(), Some("A"));
        assert_eq!(first.diagnostics[0].code, "duplicate-slug");

        let last = generate_manifest(
            &ManifestOptions::new(roots.clone()).with_duplicates(DuplicatePolicy::LastWins),
        )
        .unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last.files[0].attributes.title.as_deref(), Some("B"));

        let strict =
            generate_manifest(&ManifestOptions::new(roots).with_duplicates(DuplicatePolicy::Error));
        assert!(matches!(strict, Err(ManifestError::DuplicateSlug(s)) if s == "same"));
    }

    #[test]
    fn test_url_collision_across_roots() {
        let dir = tempdir().unwrap();
        let posts = dir.path().join("posts");
        let notes = dir.path().join("notes");
        write(&posts, "notes/x.md", "---
title: Nested
---
");
        write(&notes, "x.md", "---
title: Aliased
---
");
        let roots = vec![ContentRoot::new(&posts), ContentRoot::new(&notes)];

        let first = generate_manifest(&ManifestOptions::new(roots.clone())).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first.files[0].url_path, "/notes/x");
        assert_eq!(first.files[0].attributes.title.as_deref(), Some("Nested"));
        assert_eq!(first.diagnostics[0].code, "duplicate-url");

        let last = generate_manifest(
            &ManifestOptions::new(roots.clone()).with_duplicates(DuplicatePolicy::LastWins),
        )
        .unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last.files[0].slug, "x");
        assert_eq!(last.diagnostics[0].code, "duplicate-url");

        let strict =
            generate_manifest(&ManifestOptions::new(roots).with_duplicates(DuplicatePolicy::Error));
        assert!(matches!(strict, Err(ManifestError::DuplicateUrl(u)) if u == "/notes/x"));
    }
}
