//! Frontmatter parsing from markdown files.

use crate::models::Attributes;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Unterminated frontmatter block: expected closing '---'")]
    Unterminated,

    #[error("Frontmatter must be a mapping at the top level")]
    NotAMapping,
}

static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX.get_or_init(|| {
        Regex::new(r"(?s)^---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|$)(.*)$").unwrap()
    })
}

/// Parse frontmatter from markdown content
///
/// Returns a tuple of (attributes, markdown_body).
/// If no frontmatter is present, returns empty attributes with the full content as body.
///
/// # Example
///
/// ```
/// use folio_core::frontmatter::parse_frontmatter;
///
/// let content = "---\ntitle: My Post\ndate: 2025-01-01\n---\n# Hello World\n";
///
/// let (attrs, body) = parse_frontmatter(content).unwrap();
/// assert_eq!(attrs.title.as_deref(), Some("My Post"));
/// assert_eq!(attrs.date.as_deref(), Some("2025-01-01"));
/// assert_eq!(body, "# Hello World\n");
/// ```
pub fn parse_frontmatter(content: &str) -> Result<(Attributes, String), FrontmatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    if let Some(captures) = frontmatter_regex().captures(content) {
        let yaml = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        let body = captures.get(2).map(|m| m.as_str()).unwrap_or_default();

        Ok((parse_yaml_block(yaml)?, body.to_string()))
    } else if opens_block(content) {
        Err(FrontmatterError::Unterminated)
    } else {
        // No frontmatter, return default with full content as body
        Ok((Attributes::default(), content.to_string()))
    }
}

fn parse_yaml_block(yaml: &str) -> Result<Attributes, FrontmatterError> {
    if yaml.trim().is_empty() {
        return Ok(Attributes::default());
    }

    match serde_yaml::from_str::<serde_yaml::Value>(yaml)? {
        serde_yaml::Value::Null => Ok(Attributes::default()),
        value @ serde_yaml::Value::Mapping(_) => Ok(serde_yaml::from_value(value)?),
        _ => Err(FrontmatterError::NotAMapping),
    }
}

fn opens_block(content: &str) -> bool {
    let first_line = content.lines().next().unwrap_or_default();
    first_line.trim_end() == "---"
}
