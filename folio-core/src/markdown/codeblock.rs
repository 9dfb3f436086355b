//! Keying and pre-highlighting of fenced code blocks.
//!
//! Every non-live code block gets a [`BlockKey`] numbered from 0 in document
//! order. The key is stored on the parsed [`CodeNode`] itself, so rendering
//! reads it back instead of re-deriving it from a second walk. Live blocks are
//! left to the interactive sandbox: no key, no highlighting.

use super::highlight::{plain_code_html, Highlighter};
use super::{CodeNode, Document};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

static META_REGEX: OnceLock<Regex> = OnceLock::new();

fn meta_regex() -> &'static Regex {
    META_REGEX.get_or_init(|| Regex::new(r#"(\w+)(?:="([^"]*)")?"#).unwrap())
}

/// Positional key of a highlighted block, rendered as `code-block-{n}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockKey(pub usize);

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "code-block-{}", self.0)
    }
}

impl FromStr for BlockKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("code-block-")
            .and_then(|n| n.parse().ok())
            .map(BlockKey)
            .ok_or_else(|| format!("invalid code block key '{}'", s))
    }
}

impl Serialize for BlockKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BlockKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Flags parsed from a fence's meta string: `key` or `key="value"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeMeta {
    flags: BTreeMap<String, Option<String>>,
}

impl CodeMeta {
    pub fn parse(meta: Option<&str>) -> Self {
        let mut flags = BTreeMap::new();
        for captures in meta_regex().captures_iter(meta.unwrap_or_default()) {
            let value = captures.get(2).map(|m| m.as_str().to_string());
            flags.insert(captures[1].to_string(), value);
        }
        Self { flags }
    }

    /// `true` for a bare flag, the quoted text for `key="value"`.
    pub fn get(&self, key: &str) -> Option<Option<&str>> {
        self.flags.get(key).map(|v| v.as_deref())
    }

    /// A block is live when `live` is present and not set to an empty string.
    pub fn is_live(&self) -> bool {
        match self.get("live") {
            Some(Some(value)) => !value.is_empty(),
            Some(None) => true,
            None => false,
        }
    }
}

/// Highlighted HTML per key for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeBlockMap(BTreeMap<BlockKey, String>);

impl CodeBlockMap {
    pub fn get(&self, key: BlockKey) -> Option<&str> {
        self.0.get(&key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = BlockKey> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, key: BlockKey, html: String) {
        self.0.insert(key, html);
    }
}

/// Assign keys to the document's code nodes and highlight each keyed block.
///
/// A highlighter failure only affects its own block, which falls back to
/// unstyled `<pre><code>`.
pub fn preprocess(doc: &mut Document, highlighter: &dyn Highlighter) -> CodeBlockMap {
    let mut map = CodeBlockMap::default();
    let mut next = 0;

    for node in doc.code_nodes_mut() {
        if node.is_live() {
            node.key = None;
            continue;
        }

        let key = BlockKey(next);
        next += 1;
        node.key = Some(key);
        map.insert(key, highlight_node(node, key, highlighter));
    }

    tracing::debug!("Pre-highlighted {} code blocks", map.len());
    map
}

fn highlight_node(node: &CodeNode, key: BlockKey, highlighter: &dyn Highlighter) -> String {
    let lang = node.lang.as_deref().unwrap_or("text");
    match highlighter.highlight(&node.value, lang) {
        Ok(html) => html,
        Err(e) => {
            tracing::warn!("Highlighting {} ({}) failed: {}", key, lang, e);
            plain_code_html(&node.value)
        }
    }
}
