//! Markdown rendering: pulldown-cmark plus heading anchors, a table of
//! contents and syntax highlighting.

pub mod highlight;

use crate::slug::SlugAllocator;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

pub use highlight::HighlightTransformer;

/// Longest excerpt produced by [`summarize`], in characters
pub const SUMMARY_LIMIT: usize = 280;

#[derive(Debug, Clone)]
struct TocItem {
    level: u32,
    title: String,
    id: String,
}

/// Output of rendering a markdown body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    pub toc_html: Option<String>,
}

/// Markdown processor with the blog's extensions
pub struct MarkdownProcessor {
    options: Options,
    highlighter: HighlightTransformer,
}

impl MarkdownProcessor {
    pub fn new() -> Self {
        Self::with_theme("InspiredGitHub")
    }

    pub fn with_theme(theme: &str) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Self {
            options,
            highlighter: HighlightTransformer::new(theme),
        }
    }

    /// Convert markdown to HTML. Pure: the same body always yields the same bytes.
    pub fn convert(&self, markdown: &str) -> Rendered {
        let events: Vec<Event> = Parser::new_ext(markdown, self.options).collect();

        let headings = collect_headings(&events);
        let events = attach_heading_ids(events, &headings);
        let events = add_heading_anchors(events);
        let events = self.highlighter.transform(events);

        let mut html_output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut html_output, events.into_iter());

        let toc_html = if headings.len() < 2 {
            None
        } else {
            Some(render_toc(&headings))
        };

        Rendered {
            html: html_output,
            toc_html,
        }
    }

    /// Convert markdown to HTML without the table of contents
    pub fn convert_simple(&self, markdown: &str) -> String {
        self.convert(markdown).html
    }
}

impl Default for MarkdownProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain-text excerpt of the first paragraph, cut at [`SUMMARY_LIMIT`] characters
pub fn summarize(markdown: &str) -> String {
    let mut text = String::new();
    let mut in_paragraph = false;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Paragraph) => in_paragraph = true,
            Event::End(TagEnd::Paragraph) if in_paragraph => break,
            Event::Text(t) | Event::Code(t) if in_paragraph => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak if in_paragraph => text.push(' '),
            _ => {}
        }
    }

    let text = text.trim();
    if text.chars().count() <= SUMMARY_LIMIT {
        return text.to_string();
    }
    let cut: String = text.chars().take(SUMMARY_LIMIT).collect();
    format!("{}…", cut.trim_end())
}

fn collect_headings(events: &[Event]) -> Vec<TocItem> {
    let mut toc = Vec::new();
    let mut slugs = SlugAllocator::new();
    let mut current: Option<(u32, Option<String>, String)> = None;

    for event in events {
        match event {
            Event::Start(Tag::Heading { level, id, .. }) => {
                current = Some((*level as u32, id.as_ref().map(|s| s.to_string()), String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, _, ref mut title)) = current {
                    title.push_str(text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some((level, explicit_id, title)) = current.take() {
                    // `{#id}` attributes are kept as written, only deduplicated
                    let id = match explicit_id.filter(|id| !id.trim().is_empty()) {
                        Some(id) => slugs.claim(id.trim()),
                        None => slugs.allocate(&title, "section"),
                    };
                    toc.push(TocItem { level, title, id });
                }
            }
            _ => {}
        }
    }

    toc
}

fn attach_heading_ids<'a>(events: Vec<Event<'a>>, headings: &[TocItem]) -> Vec<Event<'a>> {
    let mut heading_iter = headings.iter();

    events
        .into_iter()
        .map(|event| match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                let id = heading_iter
                    .next()
                    .map(|item| CowStr::Boxed(item.id.clone().into_boxed_str()))
                    .or(id);
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                })
            }
            other => other,
        })
        .collect()
}

fn add_heading_anchors(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut result = Vec::with_capacity(events.len());
    let mut current_id: Option<String> = None;

    for event in events {
        match event {
            Event::Start(Tag::Heading { ref id, .. }) => {
                current_id = id.as_ref().map(|s| s.to_string());
                result.push(event);
            }
            Event::End(TagEnd::Heading(level)) => {
                if let Some(id) = current_id.take() {
                    let anchor = format!(
                        "<a class=\"heading-anchor\" href=\"#{}\" aria-label=\"Link to heading\">#</a>",
                        escape_html(&id)
                    );
                    result.push(Event::Html(CowStr::Boxed(anchor.into_boxed_str())));
                }
                result.push(Event::End(TagEnd::Heading(level)));
            }
            other => result.push(other),
        }
    }

    result
}

fn render_toc(headings: &[TocItem]) -> String {
    let mut html = String::from(r#"<nav class="toc"><h3>Contents</h3><ul class="toc-list">"#);
    for h in headings {
        html.push_str(&format!(
            r##"<li class="toc-level-{}"><a href="#{}">{}</a></li>"##,
            h.level,
            escape_html(&h.id),
            escape_html(&h.title)
        ));
    }
    html.push_str("</ul></nav>");
    html
}

pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
