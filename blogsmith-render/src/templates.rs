//! Askama template definitions.

use askama::Template;
use blogsmith_core::{Config, Document, SiteIndex};

/// Site-wide values every page needs
#[derive(Debug, Clone)]
pub struct SiteMeta {
    pub title: String,
    pub description: String,
    pub author: String,
    pub base_url: String,
    pub has_feed: bool,
}

impl SiteMeta {
    pub fn from_config(config: &Config) -> Self {
        Self {
            title: config.site.title.clone(),
            description: config.site.description.clone(),
            author: config.site.author.clone(),
            base_url: config.normalized_base_url(),
            has_feed: config.enable_rss,
        }
    }

    pub fn tag_url(&self, slug: &str) -> String {
        format!("{}tags/{}.html", self.base_url, slug)
    }

    pub fn year_url(&self, year: i32) -> String {
        format!("{}archive/{}.html", self.base_url, year)
    }
}

/// A link to a tag page
#[derive(Debug, Clone)]
pub struct TagLink {
    pub name: String,
    pub url: String,
}

/// A post as shown in listings
#[derive(Debug, Clone)]
pub struct PostEntry {
    pub url: String,
    pub title: String,
    pub date: Option<String>,
    pub description: String,
    pub tags: Vec<TagLink>,
}

impl PostEntry {
    pub fn from_document(doc: &Document, index: &SiteIndex, site: &SiteMeta) -> Self {
        Self {
            url: doc.url_with_base(&site.base_url),
            title: doc.title.clone(),
            date: doc.date_string(),
            description: doc.blurb().to_string(),
            tags: tag_links(doc, index, site),
        }
    }
}

/// Links for a document's tags, in the order the author wrote them
pub fn tag_links(doc: &Document, index: &SiteIndex, site: &SiteMeta) -> Vec<TagLink> {
    doc.tags
        .iter()
        .filter_map(|tag| {
            index.tag_slug(tag).map(|slug| TagLink {
                name: tag.clone(),
                url: site.tag_url(slug),
            })
        })
        .collect()
}

/// A tag with its page and post count, for the tag list
#[derive(Debug, Clone)]
pub struct TagSummary {
    pub name: String,
    pub url: String,
    pub count: usize,
}

/// One year of the archive
#[derive(Debug, Clone)]
pub struct YearGroup {
    pub year: i32,
    pub url: String,
    pub posts: Vec<PostEntry>,
}

/// Post page template
#[derive(Template)]
#[template(path = "post.html")]
pub struct PostTemplate {
    pub site: SiteMeta,

    // Page metadata
    pub title: String,
    pub description: String,
    pub date: Option<String>,
    pub updated: Option<String>,
    pub tags: Vec<TagLink>,
    pub img: Option<String>,

    // Content (already rendered HTML)
    pub content: String,
    pub toc_html: Option<String>,

    // Chronological navigation
    pub newer: Option<PostEntry>,
    pub older: Option<PostEntry>,
}

/// Home page: every post, newest first
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub site: SiteMeta,
    pub posts: Vec<PostEntry>,
}

/// Posts carrying one tag
#[derive(Template)]
#[template(path = "tag.html")]
pub struct TagTemplate {
    pub site: SiteMeta,
    pub tag: String,
    pub posts: Vec<PostEntry>,
}

/// All tags
#[derive(Template)]
#[template(path = "tags.html")]
pub struct TagListTemplate {
    pub site: SiteMeta,
    pub tags: Vec<TagSummary>,
}

/// All years, each with its posts
#[derive(Template)]
#[template(path = "archive.html")]
pub struct ArchiveTemplate {
    pub site: SiteMeta,
    pub years: Vec<YearGroup>,
}

/// Posts from a single year
#[derive(Template)]
#[template(path = "year.html")]
pub struct YearTemplate {
    pub site: SiteMeta,
    pub year: i32,
    pub posts: Vec<PostEntry>,
}

/// 404 error page template
#[derive(Template)]
#[template(path = "404.html")]
pub struct NotFoundTemplate {
    pub site: SiteMeta,
}
