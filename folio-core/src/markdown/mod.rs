//! Markdown parsing and per-post rendering.

pub mod codeblock;
pub mod highlight;

use crate::models::ContentFile;
use codeblock::{preprocess, BlockKey, CodeBlockMap, CodeMeta};
use highlight::{html_escape, plain_code_html, Highlighter};
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Range;

pub use highlight::{HighlightError, SyntectHighlighter};

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options
}

/// A fenced or indented code block found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeNode {
    /// First word of the info string.
    pub lang: Option<String>,
    /// Rest of the info string.
    pub meta: Option<String>,
    pub value: String,
    /// Byte range of the whole block in the source.
    pub span: Range<usize>,
    /// Set by [`codeblock::preprocess`] for non-live blocks.
    pub key: Option<BlockKey>,
}

impl CodeNode {
    pub fn is_live(&self) -> bool {
        CodeMeta::parse(self.meta.as_deref()).is_live()
    }
}

/// A parsed document: its source plus the code nodes in document order.
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    code_nodes: Vec<CodeNode>,
}

impl Document {
    /// Parse a markdown body, collecting code blocks at any nesting depth.
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut code_nodes = Vec::new();
        let mut current: Option<CodeNode> = None;

        for (event, range) in Parser::new_ext(&source, parser_options()).into_offset_iter() {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let (lang, meta) = match kind {
                        CodeBlockKind::Fenced(info) => split_info(&info),
                        CodeBlockKind::Indented => (None, None),
                    };
                    current = Some(CodeNode {
                        lang,
                        meta,
                        value: String::new(),
                        span: range,
                        key: None,
                    });
                }
                Event::Text(text) => {
                    if let Some(node) = current.as_mut() {
                        node.value.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(node) = current.take() {
                        code_nodes.push(node);
                    }
                }
                _ => {}
            }
        }

        Self { source, code_nodes }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn code_nodes(&self) -> &[CodeNode] {
        &self.code_nodes
    }

    pub(crate) fn code_nodes_mut(&mut self) -> impl Iterator<Item = &mut CodeNode> {
        self.code_nodes.iter_mut()
    }

    /// Render to HTML, substituting each code block with the fragment its
    /// attached key points to.
    ///
    /// Blocks are matched to nodes by their source position, so no key is
    /// recomputed here. Keyed blocks missing from `blocks` render unstyled.
    pub fn render(&self, blocks: &CodeBlockMap) -> String {
        let by_start: HashMap<usize, &CodeNode> = self
            .code_nodes
            .iter()
            .map(|node| (node.span.start, node))
            .collect();

        let mut events: Vec<Event<'_>> = Vec::new();
        let mut replacing = false;

        for (event, range) in Parser::new_ext(&self.source, parser_options()).into_offset_iter() {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => match by_start.get(&range.start) {
                    Some(node) => {
                        events.push(Event::Html(CowStr::from(node_html(node, blocks))));
                        replacing = true;
                    }
                    None => events.push(Event::Start(Tag::CodeBlock(kind))),
                },
                Event::End(TagEnd::CodeBlock) if replacing => replacing = false,
                _ if replacing => {}
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }
}

fn split_info(info: &str) -> (Option<String>, Option<String>) {
    let info = info.trim();
    match info.split_once(char::is_whitespace) {
        Some((lang, meta)) => {
            let meta = meta.trim();
            (
                Some(lang.to_string()),
                (!meta.is_empty()).then(|| meta.to_string()),
            )
        }
        None if info.is_empty() => (None, None),
        None => (Some(info.to_string()), None),
    }
}

fn node_html(node: &CodeNode, blocks: &CodeBlockMap) -> String {
    if node.is_live() {
        return live_placeholder(node);
    }
    match node.key.and_then(|key| blocks.get(key)) {
        Some(html) => format!("{}\n", html),
        None => format!("{}\n", plain_code_html(&node.value)),
    }
}

/// Inert element the interactive sandbox mounts onto.
fn live_placeholder(node: &CodeNode) -> String {
    format!(
        "<div class=\"live-code\" data-language=\"{}\"><pre><code>{}</code></pre></div>\n",
        html_escape(node.lang.as_deref().unwrap_or("text")),
        html_escape(&node.value)
    )
}

/// Everything the post page needs from one record's body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPost {
    pub html: String,
    pub code_blocks: CodeBlockMap,
}

/// Parse, pre-highlight and render one record's body.
pub fn render_post(file: &ContentFile, highlighter: &dyn Highlighter) -> RenderedPost {
    let mut doc = Document::parse(file.raw_body.as_str());
    let code_blocks = preprocess(&mut doc, highlighter);
    let html = doc.render(&code_blocks);
    RenderedPost { html, code_blocks }
}

/// Render markdown without code-block substitution.
pub fn render_plain(markdown: &str) -> String {
    let mut html_output = String::new();
    html::push_html(&mut html_output, Parser::new_ext(markdown, parser_options()));
    html_output
}
