//! # blogsmith-core
//!
//! Core library for the blogsmith static blog generator.
//!
//! This crate parses posts (YAML front matter plus a markdown body), renders
//! them to HTML, and aggregates them into tag and date listings.

pub mod builder;
pub mod config;
pub mod frontmatter;
pub mod index;
pub mod markdown;
pub mod models;
pub mod slug;

pub use builder::{BuildError, BuildReport, Site, SiteBuilder, Skipped};
pub use config::{Config, ErrorPolicy};
pub use frontmatter::{parse_frontmatter, render_frontmatter, FrontmatterError};
pub use index::{DocRef, SiteIndex};
pub use markdown::{MarkdownProcessor, Rendered};
pub use models::{Document, Frontmatter};
pub use slug::slugify;
