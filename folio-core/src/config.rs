//! Configuration parsing and management.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Main configuration struct matching the folio.yml schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default = "default_content")]
    pub content: Vec<ContentRootConfig>,

    #[serde(default = "default_primary")]
    pub primary: String,

    #[serde(default)]
    pub duplicate_slugs: DuplicatePolicy,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub highlight: HighlightConfig,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_content() -> Vec<ContentRootConfig> {
    vec![ContentRootConfig::Path(PathBuf::from("posts"))]
}

fn default_primary() -> String {
    String::from("posts")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_site_title")]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_site_url")]
    pub url: String,

    #[serde(default)]
    pub author: Option<String>,
}

fn default_site_title() -> String {
    String::from("folio")
}

fn default_site_url() -> String {
    String::from("http://localhost:5173")
}

/// A content root entry: either a bare path or `{ path, alias }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentRootConfig {
    Path(PathBuf),
    Aliased {
        path: PathBuf,
        #[serde(default)]
        alias: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_output() -> PathBuf {
    PathBuf::from("dist")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    5173
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_theme() -> String {
    String::from("InspiredGitHub")
}

/// What to do when two files resolve to the same slug.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Keep the first file discovered; later duplicates are excluded.
    #[default]
    FirstWins,
    /// Keep the last file discovered; earlier duplicates are excluded.
    LastWins,
    /// Abort generation.
    Error,
}

/// A directory scanned for content, with the alias used in its URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRoot {
    pub path: PathBuf,
    pub alias: Option<String>,
}

impl ContentRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            alias: None,
        }
    }

    pub fn with_alias(path: impl Into<PathBuf>, alias: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            alias: Some(alias.into()),
        }
    }

    /// Last component of the root directory.
    pub fn dir_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Explicit alias, or the directory name when none is configured.
    pub fn alias(&self) -> &str {
        match self.alias.as_deref() {
            Some(alias) if !alias.is_empty() => alias,
            _ => match self.dir_name() {
                "" => "posts",
                name => name,
            },
        }
    }

    /// Whether this root serves top-level routes.
    pub fn is_primary(&self, primary: &str) -> bool {
        self.dir_name() == primary || self.alias.as_deref() == Some(primary)
    }
}

/// Everything the pipeline needs to generate a manifest.
///
/// Passed explicitly into every entry point; there is no process-wide default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestOptions {
    pub roots: Vec<ContentRoot>,
    pub primary: String,
    pub duplicates: DuplicatePolicy,
}

impl ManifestOptions {
    pub fn new(roots: Vec<ContentRoot>) -> Self {
        Self {
            roots,
            primary: default_primary(),
            duplicates: DuplicatePolicy::default(),
        }
    }

    pub fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Aliases of all configured roots, in configuration order.
    pub fn aliases(&self) -> Vec<&str> {
        self.roots.iter().map(|r| r.alias()).collect()
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&contents)?;

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Parse configuration from YAML text; relative paths resolve against the
    /// current directory.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Get the output directory, resolved relative to config file
    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.paths.output)
    }

    /// Content roots with paths resolved relative to the config file
    pub fn content_roots(&self) -> Vec<ContentRoot> {
        self.content
            .iter()
            .map(|entry| match entry {
                ContentRootConfig::Path(path) => ContentRoot::new(self.resolve_path(path)),
                ContentRootConfig::Aliased { path, alias } => ContentRoot {
                    path: self.resolve_path(path),
                    alias: alias.clone(),
                },
            })
            .collect()
    }

    /// The explicit options value handed to the manifest pipeline
    pub fn manifest_options(&self) -> ManifestOptions {
        ManifestOptions {
            roots: self.content_roots(),
            primary: self.primary.clone(),
            duplicates: self.duplicate_slugs,
        }
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(parent) = self.config_path.as_ref().and_then(|p| p.parent()) {
            parent.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            content: default_content(),
            primary: default_primary(),
            duplicate_slugs: DuplicatePolicy::default(),
            paths: PathsConfig::default(),
            server: ServerConfig::default(),
            highlight: HighlightConfig::default(),
            config_path: None,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_site_title(),
            description: String::new(),
            url: default_site_url(),
            author: None,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
        }
    }
}
