//! Slug generation for post names, heading ids and tag pages.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

static HYPHEN_RUNS: OnceLock<Regex> = OnceLock::new();
static DATED_STEM: OnceLock<Regex> = OnceLock::new();

fn hyphen_runs() -> &'static Regex {
    HYPHEN_RUNS.get_or_init(|| Regex::new(r"-+").expect("hyphen regex is valid"))
}

fn dated_stem() -> &'static Regex {
    DATED_STEM.get_or_init(|| {
        Regex::new(r"^(\d{4}-\d{2}-\d{2})-(.+)$").expect("dated stem regex is valid")
    })
}

/// Convert a string to a URL-safe slug
///
/// Lowercases, turns whitespace and underscores into hyphens, drops
/// punctuation, keeps non-latin letters, and collapses hyphen runs.
///
/// # Examples
///
/// ```
/// use blogsmith_core::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("Objective-C & Swift"), "objective-c-swift");
/// assert_eq!(slugify("C++ Programming"), "c-programming");
/// ```
pub fn slugify(input: &str) -> String {
    let cleaned = input
        .to_lowercase()
        .graphemes(true)
        .filter_map(|g| {
            let c = g.chars().next()?;
            if c.is_whitespace() || c == '_' || c == '-' {
                Some("-")
            } else if c.is_alphanumeric() {
                Some(g)
            } else {
                None
            }
        })
        .collect::<String>();

    hyphen_runs()
        .replace_all(&cleaned, "-")
        .trim_matches('-')
        .to_string()
}

/// Split a Jekyll-style `2019-01-01-some-title` file stem into its date
/// prefix and the remaining name.
pub fn split_dated_stem(stem: &str) -> (Option<&str>, &str) {
    match dated_stem().captures(stem) {
        Some(caps) => {
            let date = caps.get(1).map(|m| m.as_str());
            let rest = caps.get(2).map(|m| m.as_str()).unwrap_or(stem);
            (date, rest)
        }
        None => (None, stem),
    }
}

/// Hands out slugs that have not been seen before, suffixing `-1`, `-2`, ...
/// on collisions. An empty slug becomes `fallback`.
#[derive(Debug, Default)]
pub struct SlugAllocator {
    seen: HashSet<String>,
}

impl SlugAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `slug` as taken so it is never handed out
    pub fn reserve(&mut self, slug: &str) {
        self.seen.insert(slug.to_string());
    }

    pub fn allocate(&mut self, text: &str, fallback: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base = fallback.to_string();
        }
        self.unique(base)
    }

    /// Deduplicate an id as written, without slugifying it
    pub fn claim(&mut self, id: &str) -> String {
        self.unique(id.to_string())
    }

    fn unique(&mut self, base: String) -> String {
        let mut candidate = base.clone();
        let mut n = 1;
        while self.seen.contains(&candidate) {
            candidate = format!("{}-{}", base, n);
            n += 1;
        }
        self.seen.insert(candidate.clone());
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("SwiftUI Architecture"), "swiftui-architecture");
    }

    #[test]
    fn test_special_characters() {
        assert_eq!(slugify("Rust & Safety"), "rust-safety");
        assert_eq!(slugify("Node.js Tips"), "nodejs-tips");
        assert_eq!(slugify("What's new?"), "whats-new");
        assert_eq!(slugify("@State vs @Binding"), "state-vs-binding");
    }

    #[test]
    fn test_unicode() {
        assert_eq!(slugify("Café"), "café");
        assert_eq!(slugify("状态 管理"), "状态-管理");
    }

    #[test]
    fn test_whitespace_and_hyphens() {
        assert_eq!(slugify("  Hello    World  "), "hello-world");
        assert_eq!(slugify("-Leading Hyphen"), "leading-hyphen");
        assert_eq!(slugify("rust_lang__basics"), "rust-lang-basics");
    }

    #[test]
    fn test_empty_and_special_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_split_dated_stem() {
        assert_eq!(
            split_dated_stem("2019-01-01-callbacks"),
            (Some("2019-01-01"), "callbacks")
        );
        assert_eq!(split_dated_stem("about"), (None, "about"));
        assert_eq!(split_dated_stem("2019-01-01"), (None, "2019-01-01"));
    }

    #[test]
    fn test_allocator_dedupes() {
        let mut slugs = SlugAllocator::new();
        assert_eq!(slugs.allocate("Usage", "section"), "usage");
        assert_eq!(slugs.allocate("Usage", "section"), "usage-1");
        assert_eq!(slugs.allocate("usage!", "section"), "usage-2");
        assert_eq!(slugs.allocate("???", "section"), "section");
        assert_eq!(slugs.allocate("", "section"), "section-1");
    }

    #[test]
    fn test_reserved_slug_is_skipped() {
        let mut slugs = SlugAllocator::new();
        slugs.reserve("index");
        assert_eq!(slugs.allocate("Index", "tag"), "index-1");
        assert_eq!(slugs.allocate("swift", "tag"), "swift");
    }

    #[test]
    fn test_claim_keeps_id_verbatim() {
        let mut slugs = SlugAllocator::new();
        assert_eq!(slugs.claim("My_ID"), "My_ID");
        assert_eq!(slugs.claim("My_ID"), "My_ID-1");
        assert_eq!(slugs.allocate("My ID", "section"), "my-id");
    }
}
