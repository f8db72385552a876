//! Site building logic - discovers posts, parses and renders them, and
//! aggregates the result into a [`SiteIndex`].

use crate::{
    config::{Config, ErrorPolicy},
    frontmatter::{parse_frontmatter, FrontmatterError},
    index::SiteIndex,
    markdown::{summarize, MarkdownProcessor},
    models::{parse_date, Document},
    slug::{slugify, split_dated_stem},
};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Pages the site emitter writes at the output root
pub const GENERATED_FILES: &[&str] = &[
    "index.html",
    "404.html",
    "posts.json",
    "feed.xml",
    "sitemap.xml",
    "style.css",
];

/// Output directories owned by the site emitter
pub const GENERATED_DIRS: &[&str] = &["tags", "archive"];

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Input directory {0:?} does not exist")]
    MissingInput(PathBuf),

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk input directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("{path}: {source}")]
    Frontmatter {
        path: String,
        #[source]
        source: FrontmatterError,
    },

    #[error("{first} and {second} both render to {output}")]
    DuplicateOutput {
        output: String,
        first: String,
        second: String,
    },

    #[error("{path} renders to {output}, which is a generated page")]
    ReservedOutput { path: String, output: String },
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }
}

/// A document that was left out of the build
#[derive(Debug)]
pub struct Skipped {
    pub path: String,
    pub error: FrontmatterError,
}

/// What happened to each discovered file
#[derive(Debug, Default)]
pub struct BuildReport {
    /// Markdown files found under the input directory
    pub discovered: usize,
    /// Documents withheld with `published: false`
    pub unpublished: Vec<String>,
    /// Documents that failed to parse and were skipped
    pub skipped: Vec<Skipped>,
}

/// Result of a build: the index of published posts plus the report
#[derive(Debug)]
pub struct Site {
    pub index: SiteIndex,
    pub report: BuildReport,
}

/// Main site builder
pub struct SiteBuilder {
    config: Config,
    processor: MarkdownProcessor,
}

impl SiteBuilder {
    pub fn new(config: Config) -> Self {
        let processor = MarkdownProcessor::with_theme(&config.highlight_theme);
        Self { config, processor }
    }

    /// Parse, render and index every post under the input directory
    pub fn build(&self) -> Result<Site, BuildError> {
        let input_dir = self.config.input_dir();
        let files = self.discover(&input_dir)?;

        tracing::info!("Found {} markdown files in {:?}", files.len(), input_dir);

        let mut report = BuildReport {
            discovered: files.len(),
            ..BuildReport::default()
        };
        let mut documents = Vec::new();
        let mut outputs: HashMap<String, String> = HashMap::new();

        for file in &files {
            let rel = relative_path(&input_dir, file);
            let bytes = fs::read(file).map_err(|e| BuildError::io(file, e))?;
            let parsed = std::str::from_utf8(&bytes)
                .map_err(FrontmatterError::from)
                .and_then(|content| self.parse_document(&rel, content));

            let mut document = match parsed {
                Ok(document) => document,
                Err(error) => match self.config.on_error {
                    ErrorPolicy::Abort => {
                        return Err(BuildError::Frontmatter {
                            path: rel,
                            source: error,
                        })
                    }
                    ErrorPolicy::Skip => {
                        tracing::warn!("Skipping {}: {}", rel, error);
                        report.skipped.push(Skipped { path: rel, error });
                        continue;
                    }
                },
            };

            if !document.published {
                tracing::debug!("Not published: {}", rel);
                report.unpublished.push(rel);
                continue;
            }

            let output = document.output_rel_path();
            if is_generated(&output) {
                return Err(BuildError::ReservedOutput { path: rel, output });
            }
            if let Some(first) = outputs.insert(output.clone(), rel.clone()) {
                return Err(BuildError::DuplicateOutput {
                    output,
                    first,
                    second: rel,
                });
            }

            let rendered = self.processor.convert(&document.body);
            document.content_html = rendered.html;
            document.toc_html = rendered.toc_html;

            tracing::debug!("Rendered {}", rel);
            documents.push(document);
        }

        let index = SiteIndex::build(documents);

        tracing::info!(
            "Indexed {} posts ({} unpublished, {} skipped)",
            index.len(),
            report.unpublished.len(),
            report.skipped.len()
        );

        Ok(Site { index, report })
    }

    /// Discover all markdown files in the input directory, in path order
    pub fn discover(&self, input_dir: &Path) -> Result<Vec<PathBuf>, BuildError> {
        if !input_dir.is_dir() {
            return Err(BuildError::MissingInput(input_dir.to_path_buf()));
        }

        let ignore_patterns = compile_ignore_patterns(&self.config.ignore_patterns);
        let mut files = Vec::new();

        for entry in WalkDir::new(input_dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() || !is_markdown(entry.path()) {
                continue;
            }

            let rel = relative_path(input_dir, entry.path());
            if should_ignore(&rel, &ignore_patterns) {
                tracing::debug!("Ignoring {} due to ignore_patterns", rel);
                continue;
            }

            files.push(entry.into_path());
        }

        Ok(files)
    }

    /// Parse one post's text into a Document (body not rendered yet)
    pub fn parse_document(&self, rel: &str, content: &str) -> Result<Document, FrontmatterError> {
        let (frontmatter, body) = parse_frontmatter(content)?;

        let stem = Path::new(rel)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(rel);
        let (stem_date, stem_name) = split_dated_stem(stem);

        // Front matter dates were validated by the parser
        let date = frontmatter
            .date
            .as_deref()
            .and_then(parse_date)
            .or_else(|| stem_date.and_then(parse_date));
        let updated = frontmatter.updated.as_deref().and_then(parse_date);

        let slug = frontmatter
            .slug
            .as_deref()
            .map(slugify)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                let from_name = slugify(stem_name);
                if from_name.is_empty() {
                    slugify(&frontmatter.title)
                } else {
                    from_name
                }
            });

        Ok(Document {
            path: rel.to_string(),
            slug,
            title: frontmatter.title.trim().to_string(),
            date,
            updated,
            tags: frontmatter.tags.clone(),
            published: frontmatter.published,
            description: frontmatter.description.clone(),
            img: frontmatter.img.clone(),
            layout: frontmatter.layout.clone(),
            permalink: frontmatter.permalink.clone(),
            summary: summarize(&body),
            body,
            content_html: String::new(),
            toc_html: None,
            frontmatter,
        })
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| MARKDOWN_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Input-relative path with `/` separators on every platform
fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_generated(output: &str) -> bool {
    GENERATED_FILES.contains(&output)
        || GENERATED_DIRS.iter().any(|dir| {
            output
                .strip_prefix(dir)
                .is_some_and(|rest| rest.starts_with('/'))
        })
}

fn compile_ignore_patterns(patterns: &[String]) -> Vec<Regex> {
    let mut compiled = Vec::new();
    for pat in patterns {
        match Regex::new(pat) {
            Ok(re) => compiled.push(re),
            Err(err) => tracing::warn!("Invalid ignore pattern '{}': {}", pat, err),
        }
    }
    compiled
}

fn should_ignore(path: &str, ignores: &[Regex]) -> bool {
    ignores.iter().any(|re| re.is_match(path))
}
