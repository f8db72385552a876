//! Code syntax highlighting using syntect.

use super::escape_html;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, Tag, TagEnd};
use std::sync::OnceLock;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::{SyntaxReference, SyntaxSet};

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

const FALLBACK_THEME: &str = "InspiredGitHub";

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme_set() -> &'static ThemeSet {
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

/// Fence info strings used in the posts that syntect knows under another name
fn syntax_alias(lang: &str) -> &str {
    match lang {
        "objc" | "objective-c" | "objectivec" | "obj-c" => "Objective-C",
        "sh" | "shell" | "zsh" | "console" => "Bourne Again Shell (bash)",
        "yml" => "YAML",
        other => other,
    }
}

/// Transformer for syntax highlighting fenced code blocks
pub struct HighlightTransformer {
    theme: &'static Theme,
}

impl HighlightTransformer {
    /// Use the named syntect theme, falling back to InspiredGitHub when it is unknown
    pub fn new(theme_name: &str) -> Self {
        let themes = theme_set();
        let theme = match themes.themes.get(theme_name) {
            Some(theme) => theme,
            None => {
                tracing::warn!(
                    "Unknown highlight theme '{}', using {}",
                    theme_name,
                    FALLBACK_THEME
                );
                themes
                    .themes
                    .get(FALLBACK_THEME)
                    .or_else(|| themes.themes.values().next())
                    .expect("syntect ships default themes")
            }
        };
        Self { theme }
    }

    /// Replace fenced code blocks that name a language with highlighted HTML.
    /// Blocks without a language pass through untouched.
    pub fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut result = Vec::with_capacity(events.len());
        let mut code_lang: Option<String> = None;
        let mut code_content = String::new();

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(ref info)))
                    if !info.trim().is_empty() =>
                {
                    let lang = info.split_whitespace().next().unwrap_or_default();
                    code_lang = Some(lang.to_string());
                    code_content.clear();
                }
                Event::Text(text) if code_lang.is_some() => {
                    code_content.push_str(&text);
                }
                Event::End(TagEnd::CodeBlock) if code_lang.is_some() => {
                    let lang = code_lang.take().unwrap_or_default();
                    let highlighted = self.highlight_code(&code_content, &lang);
                    result.push(Event::Html(CowStr::Boxed(highlighted.into_boxed_str())));
                }
                other => result.push(other),
            }
        }

        result
    }

    fn find_syntax(&self, lang: &str) -> &'static SyntaxReference {
        let ss = syntax_set();
        let lang = syntax_alias(lang);
        ss.find_syntax_by_token(lang)
            .or_else(|| ss.find_syntax_by_name(lang))
            .or_else(|| ss.find_syntax_by_extension(lang))
            .unwrap_or_else(|| ss.find_syntax_plain_text())
    }

    pub fn highlight_code(&self, code: &str, lang: &str) -> String {
        let syntax = self.find_syntax(lang);

        let inner = match highlighted_html_for_string(code, syntax_set(), syntax, self.theme) {
            Ok(html) => html,
            Err(err) => {
                tracing::debug!("Highlighting {} failed: {}", lang, err);
                format!("<pre><code>{}</code></pre>", escape_html(code))
            }
        };

        format!(
            "<div class=\"highlight\" data-lang=\"{}\">{}</div>\n",
            escape_html(lang),
            inner
        )
    }
}

impl Default for HighlightTransformer {
    fn default() -> Self {
        Self::new(FALLBACK_THEME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::Parser;

    fn highlight(markdown: &str) -> Vec<Event<'_>> {
        HighlightTransformer::default().transform(Parser::new(markdown).collect())
    }

    #[test]
    fn test_fenced_block_with_language_becomes_html() {
        let events = highlight("```swift\nlet x = 1\n```\n");
        let html: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                Event::Html(h) => Some(h.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(html.len(), 1);
        assert!(html[0].starts_with("<div class=\"highlight\" data-lang=\"swift\">"));
        assert!(html[0].contains("<pre"));
    }

    #[test]
    fn test_block_without_language_is_untouched() {
        let events = highlight("```\nplain\n```\n");
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::Start(Tag::CodeBlock(_)))));
        assert!(!events.iter().any(|e| matches!(e, Event::Html(_))));
    }

    #[test]
    fn test_unknown_language_falls_back_to_plain_text() {
        let transformer = HighlightTransformer::default();
        let html = transformer.highlight_code("<tag>", "no-such-lang");
        assert!(html.contains("data-lang=\"no-such-lang\""));
        assert!(html.contains("&lt;tag&gt;"));
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let transformer = HighlightTransformer::new("not-a-theme");
        let html = transformer.highlight_code("let a = 1", "swift");
        assert!(html.contains("<pre"));
    }
}
