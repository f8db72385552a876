//! Front matter parsing from markdown files.

use crate::models::{parse_date, Frontmatter};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Document does not start with a `---` front matter delimiter")]
    MissingDelimiter,

    #[error("Front matter is not closed by a `---` line")]
    Unterminated,

    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Unrecognized date in `{field}`: {value}")]
    InvalidDate { field: &'static str, value: String },

    #[error("Permalink {0:?} must stay inside the output directory")]
    InvalidPermalink(String),

    #[error("File is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

static CLOSING_REGEX: OnceLock<Regex> = OnceLock::new();

fn closing_regex() -> &'static Regex {
    CLOSING_REGEX.get_or_init(|| {
        Regex::new(r"(?m)^(?:---|\.\.\.)[ \t]*\r?$").expect("closing delimiter regex is valid")
    })
}

/// Split raw document text into its YAML block and markdown body.
///
/// A leading byte-order mark and blank lines before the opening `---` are
/// ignored. The block may be closed by `---` or `...`.
pub fn split_frontmatter(content: &str) -> Result<(&str, &str), FrontmatterError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let content = content.trim_start_matches(['\n', '\r']);

    let (first_line, rest) = match content.find('\n') {
        Some(i) => (&content[..i], &content[i + 1..]),
        None => (content, ""),
    };
    if first_line.trim_end() != "---" {
        return Err(FrontmatterError::MissingDelimiter);
    }

    let closing = closing_regex()
        .find(rest)
        .ok_or(FrontmatterError::Unterminated)?;
    let yaml = &rest[..closing.start()];
    let body = &rest[closing.end()..];
    let body = body
        .strip_prefix("\r\n")
        .or_else(|| body.strip_prefix('\n'))
        .unwrap_or(body);

    Ok((yaml, body))
}

/// Parse front matter from markdown content
///
/// Returns a tuple of (frontmatter, markdown_body).
///
/// # Example
///
/// ```
/// use blogsmith_core::frontmatter::parse_frontmatter;
///
/// let content = "---\ntitle: My Post\ndate: 2019-01-01\ntags: [swift]\n---\n# Hello\n";
///
/// let (fm, body) = parse_frontmatter(content).unwrap();
/// assert_eq!(fm.title, "My Post");
/// assert_eq!(fm.date, Some("2019-01-01".to_string()));
/// assert_eq!(fm.tags, vec!["swift"]);
/// assert!(body.starts_with("# Hello"));
/// ```
pub fn parse_frontmatter(content: &str) -> Result<(Frontmatter, String), FrontmatterError> {
    let (yaml, body) = split_frontmatter(content)?;

    let frontmatter: Frontmatter = if yaml.trim().is_empty() {
        Frontmatter::default()
    } else {
        serde_yaml::from_str(yaml)?
    };

    if frontmatter.title.trim().is_empty() {
        return Err(FrontmatterError::MissingField("title".to_string()));
    }

    for (field, value) in [("date", &frontmatter.date), ("updated", &frontmatter.updated)] {
        if let Some(value) = value {
            if parse_date(value).is_none() {
                return Err(FrontmatterError::InvalidDate {
                    field,
                    value: value.clone(),
                });
            }
        }
    }

    if let Some(permalink) = &frontmatter.permalink {
        check_permalink(permalink)?;
    }

    Ok((frontmatter, body.to_string()))
}

/// Permalinks are plain `/`-separated names: no `.`/`..` segments, no backslashes
fn check_permalink(permalink: &str) -> Result<(), FrontmatterError> {
    let escapes = permalink.contains('\\')
        || permalink
            .split('/')
            .any(|segment| matches!(segment.trim(), "." | ".."));
    if escapes {
        return Err(FrontmatterError::InvalidPermalink(permalink.to_string()));
    }
    Ok(())
}

/// Serialize front matter back into a delimited YAML block
pub fn render_frontmatter(frontmatter: &Frontmatter) -> Result<String, FrontmatterError> {
    let yaml = serde_yaml::to_string(frontmatter)?;
    Ok(format!("---\n{}---\n", yaml))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_jekyll_post() {
        let content = r#"---
layout: post
title: "SwiftUI 中的状态管理"
date: 2020-03-14 10:00:00 +0800
tags: [swift, swiftui]
published: true
description: Thoughts on @State and friends
img: state.png
---

# Hello World

This is the content."#;

        let (fm, body) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.layout.as_deref(), Some("post"));
        assert_eq!(fm.title, "SwiftUI 中的状态管理");
        assert_eq!(fm.date.as_deref(), Some("2020-03-14 10:00:00 +0800"));
        assert_eq!(fm.tags, vec!["swift", "swiftui"]);
        assert!(fm.published);
        assert_eq!(
            fm.description.as_deref(),
            Some("Thoughts on @State and friends")
        );
        assert_eq!(fm.img.as_deref(), Some("state.png"));
        assert!(body.starts_with("\n# Hello World"));
        assert!(body.contains("This is the content."));
    }

    #[test]
    fn test_unpublished_flag() {
        let content = "---\ntitle: Draft\npublished: false\n---\nBody";
        let (fm, body) = parse_frontmatter(content).unwrap();
        assert!(!fm.published);
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_tags_as_string() {
        let content = "---\ntitle: Tagged\ntags: ios swift, ios\n---\n";
        let (fm, _) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.tags, vec!["ios", "swift"]);
    }

    #[test]
    fn test_numeric_title_and_year_date() {
        let content = "---\ntitle: 2048\ndate: 2019-01-01\n---\n";
        let (fm, _) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.title, "2048");
    }

    #[test]
    fn test_unknown_fields_are_kept() {
        let content = "---\ntitle: Extra\ncomments: true\n---\n";
        let (fm, _) = parse_frontmatter(content).unwrap();
        assert_eq!(
            fm.extra.get("comments"),
            Some(&serde_yaml::Value::Bool(true))
        );
    }

    #[test]
    fn test_bom_and_crlf() {
        let content = "\u{feff}---\r\ntitle: Windows\r\n---\r\nBody\r\n";
        let (fm, body) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.title, "Windows");
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn test_dots_close_block() {
        let content = "---\ntitle: Dots\n...\nBody";
        let (fm, body) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.title, "Dots");
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_missing_delimiter() {
        let content = "# Just Content\n\nNo front matter here.";
        assert!(matches!(
            parse_frontmatter(content),
            Err(FrontmatterError::MissingDelimiter)
        ));
    }

    #[test]
    fn test_unterminated_block() {
        let content = "---\ntitle: Open\n\nBody without closing line";
        assert!(matches!(
            parse_frontmatter(content),
            Err(FrontmatterError::Unterminated)
        ));
    }

    #[test]
    fn test_invalid_yaml() {
        let content = r#"---
title: Test
invalid yaml: [unclosed
---

Content."#;

        assert!(matches!(
            parse_frontmatter(content),
            Err(FrontmatterError::YamlError(_))
        ));
    }

    #[test]
    fn test_missing_title() {
        let content = "---\ndescription: No title\n---\n\nContent.";
        match parse_frontmatter(content) {
            Err(FrontmatterError::MissingField(field)) => assert_eq!(field, "title"),
            other => panic!("Expected MissingField error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_block_is_missing_title() {
        let content = "---\n---\nBody";
        assert!(matches!(
            parse_frontmatter(content),
            Err(FrontmatterError::MissingField(_))
        ));
    }

    #[test]
    fn test_invalid_date() {
        let content = "---\ntitle: When\ndate: someday\n---\n";
        match parse_frontmatter(content) {
            Err(FrontmatterError::InvalidDate { field, value }) => {
                assert_eq!(field, "date");
                assert_eq!(value, "someday");
            }
            other => panic!("Expected InvalidDate error, got {:?}", other),
        }
    }

    #[test]
    fn test_render_then_parse_keeps_fields() {
        let content = r#"---
layout: post
title: "Callbacks: blocks, delegates & closures"
date: 2019-01-01
tags:
  - objective-c
  - swift
published: false
description: "Three ways to call back"
img: "callbacks.jpg"
comments: true
---
Body"#;

        let (original, _) = parse_frontmatter(content).unwrap();
        let rendered = render_frontmatter(&original).unwrap();
        assert!(rendered.starts_with("---\n"));
        assert!(rendered.ends_with("---\n"));

        let (reparsed, body) = parse_frontmatter(&rendered).unwrap();
        assert_eq!(reparsed, original);
        assert_eq!(body, "");
    }

    #[test]
    fn test_permalink_cannot_leave_output() {
        for permalink in ["../escaped", "/posts/../../etc/passwd", "./x", "a\\..\\b"] {
            let content = format!("---\ntitle: Escape\npermalink: '{}'\n---\n", permalink);
            assert!(
                matches!(
                    parse_frontmatter(&content),
                    Err(FrontmatterError::InvalidPermalink(_))
                ),
                "{} was accepted",
                permalink
            );
        }

        let content = "---\ntitle: About\npermalink: /about/\n---\n";
        let (fm, _) = parse_frontmatter(content).unwrap();
        assert_eq!(fm.permalink.as_deref(), Some("/about/"));
    }
}
