//! Site index: the published posts in reverse-chronological order, grouped
//! by tag and by year.

use crate::models::Document;
use crate::slug::SlugAllocator;
use chrono::Datelike;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Position of a document in [`SiteIndex::documents`]
pub type DocRef = usize;

/// Newest first; undated posts go last; ties are broken by source path.
pub fn newest_first(a: &Document, b: &Document) -> Ordering {
    match (a.date, b.date) {
        (Some(da), Some(db)) => db.cmp(&da),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.path.cmp(&b.path))
}

#[derive(Debug, Clone, Default)]
pub struct SiteIndex {
    documents: Vec<Document>,
    tags: BTreeMap<String, Vec<DocRef>>,
    tag_slugs: BTreeMap<String, String>,
    archive: BTreeMap<i32, Vec<DocRef>>,
}

impl SiteIndex {
    /// Aggregate documents into listings. Unpublished documents are dropped.
    pub fn build(documents: Vec<Document>) -> Self {
        let mut documents: Vec<Document> = documents.into_iter().filter(|d| d.published).collect();
        documents.sort_by(newest_first);

        let mut tags: BTreeMap<String, Vec<DocRef>> = BTreeMap::new();
        let mut archive: BTreeMap<i32, Vec<DocRef>> = BTreeMap::new();

        for (idx, doc) in documents.iter().enumerate() {
            for tag in &doc.tags {
                tags.entry(tag.clone()).or_default().push(idx);
            }
            if let Some(date) = doc.date {
                archive.entry(date.year()).or_default().push(idx);
            }
        }

        // Tags are visited in sorted order, so "Swift" and "swift" always
        // resolve to the same pair of page names. `tags/index.html` is the
        // tag list itself.
        let mut slugs = SlugAllocator::new();
        slugs.reserve("index");
        let tag_slugs = tags
            .keys()
            .map(|tag| (tag.clone(), slugs.allocate(tag, "tag")))
            .collect();

        tracing::debug!(
            "Indexed {} documents, {} tags, {} years",
            documents.len(),
            tags.len(),
            archive.len()
        );

        Self {
            documents,
            tags,
            tag_slugs,
            archive,
        }
    }

    /// Published documents, newest first
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Documents carrying `tag`, newest first
    pub fn tag(&self, tag: &str) -> Vec<&Document> {
        self.tags
            .get(tag)
            .map(|refs| refs.iter().map(|&r| &self.documents[r]).collect())
            .unwrap_or_default()
    }

    /// Every tag with its documents, in tag order
    pub fn tags(&self) -> impl Iterator<Item = (&str, Vec<&Document>)> {
        self.tags.iter().map(|(tag, refs)| {
            (
                tag.as_str(),
                refs.iter().map(|&r| &self.documents[r]).collect(),
            )
        })
    }

    /// Page name for a tag, unique across the site
    pub fn tag_slug(&self, tag: &str) -> Option<&str> {
        self.tag_slugs.get(tag).map(String::as_str)
    }

    /// Years with posts, newest first
    pub fn years(&self) -> Vec<i32> {
        self.archive.keys().rev().copied().collect()
    }

    /// Documents published in `year`, newest first
    pub fn year(&self, year: i32) -> Vec<&Document> {
        self.archive
            .get(&year)
            .map(|refs| refs.iter().map(|&r| &self.documents[r]).collect())
            .unwrap_or_default()
    }

    /// The neighbours of a document in the chronological listing:
    /// (newer, older)
    pub fn neighbours(&self, doc: DocRef) -> (Option<&Document>, Option<&Document>) {
        let newer = doc.checked_sub(1).and_then(|i| self.documents.get(i));
        let older = self.documents.get(doc + 1);
        (newer, older)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{parse_date, Frontmatter};

    fn doc(path: &str, date: Option<&str>, tags: &[&str], published: bool) -> Document {
        Document {
            path: path.into(),
            slug: path.trim_end_matches(".md").into(),
            title: path.into(),
            date: date.and_then(parse_date),
            updated: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            published,
            description: None,
            img: None,
            layout: None,
            permalink: None,
            body: String::new(),
            content_html: String::new(),
            toc_html: None,
            summary: String::new(),
            frontmatter: Frontmatter::default(),
        }
    }

    fn paths(docs: &[&Document]) -> Vec<String> {
        docs.iter().map(|d| d.path.clone()).collect()
    }

    #[test]
    fn test_tag_index_is_newest_first() {
        let index = SiteIndex::build(vec![
            doc("old.md", Some("2019-01-01"), &["swift"], true),
            doc("new.md", Some("2020-01-01"), &["swift"], true),
        ]);

        assert_eq!(paths(&index.tag("swift")), vec!["new.md", "old.md"]);
    }

    #[test]
    fn test_tag_index_contains_exactly_tagged_documents() {
        let index = SiteIndex::build(vec![
            doc("a.md", Some("2019-05-01"), &["swift", "ios"], true),
            doc("b.md", Some("2019-06-01"), &["objc"], true),
            doc("c.md", Some("2019-07-01"), &["ios"], true),
        ]);

        assert_eq!(paths(&index.tag("ios")), vec!["c.md", "a.md"]);
        assert_eq!(paths(&index.tag("objc")), vec!["b.md"]);
        assert!(index.tag("rust").is_empty());

        let tags: Vec<&str> = index.tags().map(|(t, _)| t).collect();
        assert_eq!(tags, vec!["ios", "objc", "swift"]);
    }

    #[test]
    fn test_unpublished_documents_are_excluded() {
        let index = SiteIndex::build(vec![
            doc("live.md", Some("2019-01-01"), &["swift"], true),
            doc("draft.md", Some("2020-01-01"), &["swift"], false),
        ]);

        assert_eq!(index.len(), 1);
        assert_eq!(paths(&index.tag("swift")), vec!["live.md"]);
        assert_eq!(index.year(2020).len(), 0);
    }

    #[test]
    fn test_undated_documents_sort_last_and_skip_archive() {
        let index = SiteIndex::build(vec![
            doc("b-undated.md", None, &[], true),
            doc("a-undated.md", None, &[], true),
            doc("dated.md", Some("2018-02-02"), &[], true),
        ]);

        let order: Vec<&str> = index.documents().iter().map(|d| d.path.as_str()).collect();
        assert_eq!(order, vec!["dated.md", "a-undated.md", "b-undated.md"]);
        assert_eq!(index.years(), vec![2018]);
    }

    #[test]
    fn test_same_day_ties_break_on_path() {
        let index = SiteIndex::build(vec![
            doc("z.md", Some("2019-01-01"), &["t"], true),
            doc("a.md", Some("2019-01-01"), &["t"], true),
        ]);
        assert_eq!(paths(&index.tag("t")), vec!["a.md", "z.md"]);
    }

    #[test]
    fn test_archive_by_year() {
        let index = SiteIndex::build(vec![
            doc("a.md", Some("2019-01-01"), &[], true),
            doc("b.md", Some("2019-12-01"), &[], true),
            doc("c.md", Some("2021-03-01"), &[], true),
        ]);

        assert_eq!(index.years(), vec![2021, 2019]);
        assert_eq!(paths(&index.year(2019)), vec!["b.md", "a.md"]);
    }

    #[test]
    fn test_colliding_tag_slugs_are_disambiguated() {
        let index = SiteIndex::build(vec![doc("a.md", None, &["Swift", "swift"], true)]);
        assert_eq!(index.tag_slug("Swift"), Some("swift"));
        assert_eq!(index.tag_slug("swift"), Some("swift-1"));
        assert_eq!(index.tag_slug("missing"), None);
    }

    #[test]
    fn test_tag_named_index_does_not_take_the_tag_list_page() {
        let index = SiteIndex::build(vec![doc("a.md", None, &["index", "Index"], true)]);
        assert_eq!(index.tag_slug("Index"), Some("index-1"));
        assert_eq!(index.tag_slug("index"), Some("index-2"));
    }

    #[test]
    fn test_neighbours() {
        let index = SiteIndex::build(vec![
            doc("a.md", Some("2019-01-01"), &[], true),
            doc("b.md", Some("2019-02-01"), &[], true),
            doc("c.md", Some("2019-03-01"), &[], true),
        ]);

        let (newer, older) = index.neighbours(1);
        assert_eq!(newer.map(|d| d.path.as_str()), Some("c.md"));
        assert_eq!(older.map(|d| d.path.as_str()), Some("a.md"));

        let (newer, _) = index.neighbours(0);
        assert!(newer.is_none());
    }
}
