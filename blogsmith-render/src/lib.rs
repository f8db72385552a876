//! # blogsmith-render
//!
//! Page templates for blogsmith.
//!
//! This crate handles HTML template rendering using Askama.

pub mod templates;

pub use templates::{
    tag_links, ArchiveTemplate, IndexTemplate, NotFoundTemplate, PostEntry, PostTemplate,
    SiteMeta, TagLink, TagListTemplate, TagSummary, TagTemplate, YearGroup, YearTemplate,
};
