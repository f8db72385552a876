//! Content model structs for posts and their front matter.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Front matter metadata from markdown files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,

    #[serde(default, deserialize_with = "scalar_string")]
    pub title: String,

    #[serde(
        default,
        deserialize_with = "optional_scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<String>,

    #[serde(
        default,
        deserialize_with = "tag_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,

    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub published: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permalink: Option<String>,

    #[serde(
        default,
        deserialize_with = "optional_scalar_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated: Option<String>,

    /// Fields blogsmith does not interpret (e.g. `comments`, `author`)
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for Frontmatter {
    fn default() -> Self {
        Self {
            layout: None,
            title: String::new(),
            date: None,
            tags: Vec::new(),
            published: true,
            description: None,
            img: None,
            slug: None,
            permalink: None,
            updated: None,
            extra: BTreeMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

fn scalar_to_string(value: serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_scalar_string(deserializer)?.unwrap_or_default())
}

fn optional_scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_yaml::Value::deserialize(deserializer)?;
    match value {
        serde_yaml::Value::Null => Ok(None),
        other => scalar_to_string(other)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("expected a scalar value")),
    }
}

/// Tags may be written as a YAML list or as a single "swift, ios" string.
/// Duplicates are dropped, first occurrence wins.
fn tag_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<String> = match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Null => Vec::new(),
        serde_yaml::Value::Sequence(items) => items
            .into_iter()
            .map(|item| {
                scalar_to_string(item)
                    .ok_or_else(|| serde::de::Error::custom("tags must be scalar values"))
            })
            .collect::<Result<_, _>>()?,
        other => scalar_to_string(other)
            .ok_or_else(|| serde::de::Error::custom("tags must be a list or a string"))?
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(str::to_string)
            .collect(),
    };

    let mut tags: Vec<String> = Vec::with_capacity(raw.len());
    for tag in raw {
        let tag = tag.trim();
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    Ok(tags)
}

/// Parse the date formats found in Jekyll-style front matter.
///
/// Offsets are dropped after conversion: a post dated `2019-03-01 01:00:00 +0800`
/// is filed under March 1st, the day its author saw.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S %z", "%Y-%m-%d %H:%M %z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.naive_local());
        }
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// A single post in the site
#[derive(Debug, Clone)]
pub struct Document {
    /// Source path relative to the input root, `/`-separated
    pub path: String,

    /// URL slug (e.g., "swift-callbacks")
    pub slug: String,

    /// Display title
    pub title: String,

    /// Publication date
    pub date: Option<NaiveDateTime>,

    /// Last updated date
    pub updated: Option<NaiveDateTime>,

    pub tags: Vec<String>,

    pub published: bool,

    pub description: Option<String>,

    /// Cover image
    pub img: Option<String>,

    pub layout: Option<String>,

    /// Custom permalink (overrides the mirrored source path)
    pub permalink: Option<String>,

    /// Raw markdown body (without front matter)
    pub body: String,

    /// Rendered HTML content
    pub content_html: String,

    /// Table of contents HTML
    pub toc_html: Option<String>,

    /// Plain-text excerpt of the first paragraph
    pub summary: String,

    /// Original front matter
    pub frontmatter: Frontmatter,
}

impl Document {
    /// Relative output path for this document (no leading slash)
    pub fn output_rel_path(&self) -> String {
        match &self.permalink {
            Some(permalink) => normalize_permalink(permalink),
            None => source_to_html_path(&self.path),
        }
    }

    /// Get the URL for this document including a base path
    pub fn url_with_base(&self, base_url: &str) -> String {
        format!(
            "{}{}",
            crate::config::normalize_base_url(base_url),
            self.output_rel_path()
        )
    }

    /// Publication day, formatted for display
    pub fn date_string(&self) -> Option<String> {
        self.date.map(|d| d.format("%Y-%m-%d").to_string())
    }

    /// Description if given, the excerpt otherwise
    pub fn blurb(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.summary)
    }
}

fn source_to_html_path(path: &str) -> String {
    match path.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains('/') => format!("{}.html", stem),
        _ => format!("{}.html", path),
    }
}

/// Output path for a permalink. Only plain segments are kept, so the result
/// always stays under the output directory.
fn normalize_permalink(permalink: &str) -> String {
    let permalink = permalink.trim();
    let p = permalink
        .split(['/', '\\'])
        .filter(|segment| !matches!(*segment, "" | "." | ".."))
        .collect::<Vec<_>>()
        .join("/");

    if p.is_empty() {
        "index.html".to_string()
    } else if permalink.ends_with('/') {
        format!("{}/index.html", p)
    } else if p.ends_with(".html") {
        p
    } else {
        format!("{}.html", p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(path: &str) -> Document {
        Document {
            path: path.into(),
            slug: "callbacks".into(),
            title: "Callbacks".into(),
            date: None,
            updated: None,
            tags: vec!["swift".into()],
            published: true,
            description: None,
            img: None,
            layout: None,
            permalink: None,
            body: String::new(),
            content_html: String::new(),
            toc_html: None,
            summary: "First paragraph".into(),
            frontmatter: Frontmatter::default(),
        }
    }

    #[test]
    fn test_output_path_mirrors_source() {
        let doc = document("2019/2019-05-01-callbacks.md");
        assert_eq!(doc.output_rel_path(), "2019/2019-05-01-callbacks.html");
        assert_eq!(
            doc.url_with_base("/blog"),
            "/blog/2019/2019-05-01-callbacks.html"
        );
    }

    #[test]
    fn test_permalink_overrides_path() {
        let mut doc = document("callbacks.md");
        doc.permalink = Some("/swift/callbacks/".into());
        assert_eq!(doc.output_rel_path(), "swift/callbacks/index.html");

        doc.permalink = Some("about".into());
        assert_eq!(doc.output_rel_path(), "about.html");

        doc.permalink = Some("/".into());
        assert_eq!(doc.output_rel_path(), "index.html");
    }

    #[test]
    fn test_permalink_stays_inside_output() {
        let mut doc = document("callbacks.md");
        doc.permalink = Some("../escaped".into());
        assert_eq!(doc.output_rel_path(), "escaped.html");

        doc.permalink = Some("/a/./../../b/".into());
        assert_eq!(doc.output_rel_path(), "a/b/index.html");

        doc.permalink = Some("..\\..\\x.html".into());
        assert_eq!(doc.output_rel_path(), "x.html");
    }

    #[test]
    fn test_blurb_prefers_description() {
        let mut doc = document("a.md");
        assert_eq!(doc.blurb(), "First paragraph");
        doc.description = Some("Custom".into());
        assert_eq!(doc.blurb(), "Custom");
    }

    #[test]
    fn test_parse_date_formats() {
        let day = NaiveDate::from_ymd_opt(2019, 3, 1).unwrap();

        assert_eq!(parse_date("2019-03-01"), day.and_hms_opt(0, 0, 0));
        assert_eq!(parse_date("2019/03/01"), day.and_hms_opt(0, 0, 0));
        assert_eq!(parse_date("2019-03-01 10:30"), day.and_hms_opt(10, 30, 0));
        assert_eq!(
            parse_date("2019-03-01 01:00:00 +0800"),
            day.and_hms_opt(1, 0, 0)
        );
        assert_eq!(
            parse_date("2019-03-01T08:15:00Z"),
            day.and_hms_opt(8, 15, 0)
        );
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2019-13-01"), None);
    }

    #[test]
    fn test_default_frontmatter_is_published() {
        assert!(Frontmatter::default().published);
    }
}
