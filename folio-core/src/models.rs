//! Content model structs for content records, attributes, and the manifest.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A `{ key, value }` pair from a structured `data` or `links` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaEntry {
    pub key: String,
    pub value: String,
}

impl MetaEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Merged metadata for a content record.
///
/// Well-known fields are typed; any other frontmatter key lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default, deserialize_with = "scalar_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// ISO-8601 date or date-time.
    #[serde(default, deserialize_with = "scalar_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Literal `YYYY-MM-DD` publication date.
    #[serde(rename = "publishedAt")]
    #[serde(default, deserialize_with = "scalar_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,

    /// A single scalar is read as a one-item list.
    #[serde(default, deserialize_with = "string_list")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    #[serde(default, deserialize_with = "scalar_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(default, deserialize_with = "meta_entries")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<MetaEntry>>,

    #[serde(default, deserialize_with = "meta_entries")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<MetaEntry>>,

    /// Frontmatter keys without a dedicated field.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Attributes {
    /// Title for display, falling back to `Untitled`.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }
}

/// A single content record in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentFile {
    /// Absolute source location
    pub path: PathBuf,

    /// Unique key within one manifest
    pub slug: String,

    /// Canonical route, always with a leading `/`
    pub url_path: String,

    pub attributes: Attributes,

    /// Content with frontmatter stripped
    pub raw_body: String,
}

/// Ordered catalog of content records for one generation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub files: Vec<ContentFile>,

    /// Problems found while generating; not part of the exported artifact.
    #[serde(skip)]
    pub diagnostics: Vec<Diagnostic>,
}

impl Manifest {
    pub fn new(files: Vec<ContentFile>) -> Self {
        Self {
            files,
            diagnostics: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Find a record by slug
    pub fn find_by_slug(&self, slug: &str) -> Option<&ContentFile> {
        self.files.iter().find(|f| f.slug == slug)
    }
}

impl PartialEq for Manifest {
    fn eq(&self, other: &Self) -> bool {
        self.files == other.files
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Warning,
    Error,
}

/// A problem attached to one source file during generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub severity: DiagnosticSeverity,
    pub source_path: Option<PathBuf>,
}

impl Diagnostic {
    pub fn warning(code: &str, message: impl Into<String>, source_path: Option<PathBuf>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            severity: DiagnosticSeverity::Warning,
            source_path,
        }
    }

    pub fn error(code: &str, message: impl Into<String>, source_path: Option<PathBuf>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            severity: DiagnosticSeverity::Error,
            source_path,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Str(s) => s,
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarList {
    One(Scalar),
    Many(Vec<Option<Scalar>>),
}

/// Accept any YAML scalar for a string-typed attribute.
fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(value.map(Scalar::into_string))
}

/// Accept one scalar or a list of scalars; null items are dropped.
fn string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<ScalarList>::deserialize(deserializer)?;
    Ok(value.map(|list| match list {
        ScalarList::One(scalar) => vec![scalar.into_string()],
        ScalarList::Many(items) => items.into_iter().flatten().map(Scalar::into_string).collect(),
    }))
}

/// Accept either a mapping (`{ Role: Author }`) or a list of `{ key, value }`.
fn meta_entries<'de, D>(deserializer: D) -> Result<Option<Vec<MetaEntry>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    let Some(value) = value else {
        return Ok(None);
    };

    match value {
        serde_yaml::Value::Null => Ok(None),
        serde_yaml::Value::Mapping(map) => Ok(Some(
            map.into_iter()
                .map(|(k, v)| MetaEntry::new(stringify_yaml(&k), stringify_yaml(&v)))
                .collect(),
        )),
        serde_yaml::Value::Sequence(items) => items
            .into_iter()
            .map(|item| serde_yaml::from_value::<MetaEntry>(item).map_err(D::Error::custom))
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        other => Err(D::Error::custom(format!(
            "expected a mapping or a list of key/value entries, found {}",
            stringify_yaml(&other)
        ))),
    }
}

fn stringify_yaml(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::Null => "null".to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_mapping_becomes_entries() {
        let attrs: Attributes =
            serde_yaml::from_str("data:\n  Role: Author\n  Year: 2024\n").unwrap();
        assert_eq!(
            attrs.data,
            Some(vec![
                MetaEntry::new("Role", "Author"),
                MetaEntry::new("Year", "2024"),
            ])
        );
    }

    #[test]
    fn test_links_list_is_accepted() {
        let attrs: Attributes =
            serde_yaml::from_str("links:\n  - key: GitHub\n    value: https://github.com\n")
                .unwrap();
        assert_eq!(
            attrs.links,
            Some(vec![MetaEntry::new("GitHub", "https://github.com")])
        );
    }

    #[test]
    fn test_scalar_fields_accept_numbers() {
        let attrs: Attributes = serde_yaml::from_str("title: 1984\nslug: 42\n").unwrap();
        assert_eq!(attrs.title.as_deref(), Some("1984"));
        assert_eq!(attrs.slug.as_deref(), Some("42"));
    }

    #[test]
    fn test_single_tag_becomes_list() {
        let attrs: Attributes = serde_yaml::from_str("tags: rust\n").unwrap();
        assert_eq!(attrs.tags, Some(vec!["rust".to_string()]));
    }

    #[test]
    fn test_tag_list_stringifies_scalars() {
        let attrs: Attributes = serde_yaml::from_str("tags: [rust, 2024, true]\n").unwrap();
        assert_eq!(
            attrs.tags,
            Some(vec!["rust".to_string(), "2024".to_string(), "true".to_string()])
        );
    }

    #[test]
    fn test_unknown_keys_kept_in_extra() {
        let attrs: Attributes = serde_yaml::from_str("title: Post\nimage: true\n").unwrap();
        assert_eq!(attrs.extra.get("image"), Some(&serde_json::Value::Bool(true)));
    }

    #[test]
    fn test_content_file_json_shape() {
        let file = ContentFile {
            path: PathBuf::from("/site/posts/hello.md"),
            slug: "hello".into(),
            url_path: "/hello".into(),
            attributes: Attributes {
                published_at: Some("2024-03-05".into()),
                ..Attributes::default()
            },
            raw_body: "Hi".into(),
        };

        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(value["urlPath"], "/hello");
        assert_eq!(value["rawBody"], "Hi");
        assert_eq!(value["attributes"]["publishedAt"], "2024-03-05");
        assert!(value["attributes"].get("title").is_none());
    }

    #[test]
    fn test_manifest_equality_ignores_diagnostics() {
        let a = Manifest::new(Vec::new());
        let mut b = Manifest::new(Vec::new());
        b.diagnostics
            .push(Diagnostic::warning("x", "ignored", None));
        assert_eq!(a, b);
    }
}
