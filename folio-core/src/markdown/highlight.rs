//! Code syntax highlighting using syntect.

use std::sync::OnceLock;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;
use thiserror::Error;

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

/// Theme used when none is configured.
pub const DEFAULT_THEME: &str = "InspiredGitHub";

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("Unknown highlight theme: {0}")]
    UnknownTheme(String),

    #[error("Highlighting failed: {0}")]
    Render(#[from] syntect::Error),
}

/// Turns source text into an HTML fragment.
///
/// Implementations must be safe to share across concurrent renders.
pub trait Highlighter: Send + Sync {
    fn highlight(&self, code: &str, lang: &str) -> Result<String, HighlightError>;
}

/// Highlighter backed by syntect's bundled syntaxes and themes.
pub struct SyntectHighlighter {
    theme: &'static Theme,
}

impl SyntectHighlighter {
    pub fn new(theme_name: &str) -> Result<Self, HighlightError> {
        let theme = theme_set()
            .themes
            .get(theme_name)
            .ok_or_else(|| HighlightError::UnknownTheme(theme_name.to_string()))?;
        Ok(Self { theme })
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, lang: &str) -> Result<String, HighlightError> {
        let ss = syntax_set();
        let syntax = ss
            .find_syntax_by_token(lang)
            .or_else(|| ss.find_syntax_by_extension(lang))
            .unwrap_or_else(|| ss.find_syntax_plain_text());

        Ok(highlighted_html_for_string(code, ss, syntax, self.theme)?)
    }
}

/// Unstyled `<pre><code>` rendering of raw text.
pub fn plain_code_html(code: &str) -> String {
    format!("<pre><code>{}</code></pre>", html_escape(code))
}

/// Escape text for HTML content and attribute values.
pub(crate) fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
