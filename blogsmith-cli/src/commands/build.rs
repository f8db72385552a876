//! Build command implementation: renders the site index to disk.

use crate::feeds;
use anyhow::{bail, Context, Result};
use askama::Template;
use blogsmith_core::{BuildReport, Config, SiteBuilder, SiteIndex};
use blogsmith_render::{
    tag_links, ArchiveTemplate, IndexTemplate, NotFoundTemplate, PostEntry, PostTemplate,
    SiteMeta, TagListTemplate, TagSummary, TagTemplate, YearGroup, YearTemplate,
};
use include_dir::{include_dir, Dir};
use serde::Serialize;
use std::fs;
use std::path::Path;

// Embed static assets (CSS) at compile time so they're available after cargo install
static STATIC_ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");

/// Marks a directory as blogsmith output; only such directories are cleaned
pub const OUTPUT_MARKER: &str = ".blogsmith";

/// Build the static site and write it to the configured output directory
pub fn build_site(config: Config) -> Result<BuildReport> {
    tracing::info!("Building site: {}", config.site.title);

    let builder = SiteBuilder::new(config.clone());
    let site = builder.build().context("Failed to build site")?;

    let pages = emit_site(&config, &site.index)?;

    tracing::info!("✓ Built {} pages from {} posts", pages, site.index.len());
    tracing::info!("✓ Output written to {:?}", config.output_dir());

    Ok(site.report)
}

/// Write every page, index, feed and asset. Returns the number of HTML pages.
pub fn emit_site(config: &Config, index: &SiteIndex) -> Result<usize> {
    let output_dir = config.output_dir();

    if config.clean_output {
        clean_output_dir(&output_dir, &config.input_dir())?;
    }
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;
    write_file(
        &output_dir,
        OUTPUT_MARKER,
        "Generated by blogsmith. This directory is replaced on every build.\n",
    )?;

    let site = SiteMeta::from_config(config);
    let mut pages = 0;

    pages += render_post_pages(&output_dir, &site, index)?;
    pages += render_listing_pages(&output_dir, &site, index)?;
    pages += render_tag_pages(&output_dir, &site, index)?;
    pages += render_archive_pages(&output_dir, &site, index)?;

    let not_found = NotFoundTemplate { site: site.clone() }
        .render()
        .context("Failed to render 404 template")?;
    write_file(&output_dir, "404.html", &not_found)?;
    pages += 1;

    generate_posts_json(&output_dir, &site, index)?;

    if config.enable_rss {
        let rss = feeds::rss(config, index);
        write_file(&output_dir, "feed.xml", &rss)?;
        tracing::info!("Generated feed.xml");
    } else {
        tracing::info!("RSS disabled; skipping feed.xml");
    }

    if config.enable_sitemap {
        let sitemap = feeds::sitemap(config, index);
        write_file(&output_dir, "sitemap.xml", &sitemap)?;
        tracing::info!("Generated sitemap.xml");
    } else {
        tracing::info!("Sitemap disabled; skipping sitemap.xml");
    }

    extract_embedded_static(&output_dir)?;

    Ok(pages)
}

/// Remove the previous output so withdrawn posts do not linger
fn clean_output_dir(output_dir: &Path, input_dir: &Path) -> Result<()> {
    if !output_dir.exists() {
        return Ok(());
    }

    let output_abs = output_dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve {:?}", output_dir))?;
    if let Ok(input_abs) = input_dir.canonicalize() {
        if input_abs.starts_with(&output_abs) {
            bail!(
                "Refusing to clean {:?}: it contains the input directory {:?}",
                output_dir,
                input_dir
            );
        }
    }

    let is_empty = fs::read_dir(output_dir)
        .with_context(|| format!("Failed to read {:?}", output_dir))?
        .next()
        .is_none();
    if !is_empty && !output_dir.join(OUTPUT_MARKER).is_file() {
        bail!(
            "Refusing to clean {:?}: it has no {} file, so it was not built by blogsmith",
            output_dir,
            OUTPUT_MARKER
        );
    }

    fs::remove_dir_all(output_dir)
        .with_context(|| format!("Failed to clean output directory {:?}", output_dir))?;
    tracing::debug!("Cleaned {:?}", output_dir);
    Ok(())
}

fn write_file(output_dir: &Path, rel: &str, contents: &str) -> Result<()> {
    let path = output_dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {:?}", parent))?;
    }
    fs::write(&path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}

fn entries<'a>(
    docs: impl IntoIterator<Item = &'a blogsmith_core::Document>,
    site: &SiteMeta,
    index: &SiteIndex,
) -> Vec<PostEntry> {
    docs.into_iter()
        .map(|doc| PostEntry::from_document(doc, index, site))
        .collect()
}

fn render_post_pages(output_dir: &Path, site: &SiteMeta, index: &SiteIndex) -> Result<usize> {
    for (idx, doc) in index.documents().iter().enumerate() {
        let (newer, older) = index.neighbours(idx);

        let template = PostTemplate {
            site: site.clone(),
            title: doc.title.clone(),
            description: doc.blurb().to_string(),
            date: doc.date_string(),
            updated: doc.updated.map(|d| d.format("%Y-%m-%d").to_string()),
            tags: tag_links(doc, index, site),
            img: doc.img.clone(),
            content: doc.content_html.clone(),
            toc_html: doc.toc_html.clone(),
            newer: newer.map(|d| PostEntry::from_document(d, index, site)),
            older: older.map(|d| PostEntry::from_document(d, index, site)),
        };

        let html = template
            .render()
            .with_context(|| format!("Failed to render post template for {}", doc.path))?;
        write_file(output_dir, &doc.output_rel_path(), &html)?;

        tracing::debug!("Rendered: {}", doc.output_rel_path());
    }

    Ok(index.len())
}

fn render_listing_pages(output_dir: &Path, site: &SiteMeta, index: &SiteIndex) -> Result<usize> {
    let home = IndexTemplate {
        site: site.clone(),
        posts: entries(index.documents(), site, index),
    };
    let html = home.render().context("Failed to render index template")?;
    write_file(output_dir, "index.html", &html)?;
    Ok(1)
}

fn render_tag_pages(output_dir: &Path, site: &SiteMeta, index: &SiteIndex) -> Result<usize> {
    let mut summaries = Vec::new();
    let mut pages = 0;

    for (tag, docs) in index.tags() {
        let Some(slug) = index.tag_slug(tag) else {
            continue;
        };

        summaries.push(TagSummary {
            name: tag.to_string(),
            url: site.tag_url(slug),
            count: docs.len(),
        });

        let page = TagTemplate {
            site: site.clone(),
            tag: tag.to_string(),
            posts: entries(docs, site, index),
        };
        let html = page
            .render()
            .with_context(|| format!("Failed to render tag page for {}", tag))?;
        write_file(output_dir, &format!("tags/{}.html", slug), &html)?;
        pages += 1;
    }

    let list = TagListTemplate {
        site: site.clone(),
        tags: summaries,
    };
    let html = list.render().context("Failed to render tag list")?;
    write_file(output_dir, "tags/index.html", &html)?;

    tracing::info!("Rendered {} tag pages", pages);
    Ok(pages + 1)
}

fn render_archive_pages(output_dir: &Path, site: &SiteMeta, index: &SiteIndex) -> Result<usize> {
    let mut groups = Vec::new();

    for year in index.years() {
        let posts = entries(index.year(year), site, index);

        let page = YearTemplate {
            site: site.clone(),
            year,
            posts: posts.clone(),
        };
        let html = page
            .render()
            .with_context(|| format!("Failed to render archive for {}", year))?;
        write_file(output_dir, &format!("archive/{}.html", year), &html)?;

        groups.push(YearGroup {
            year,
            url: site.year_url(year),
            posts,
        });
    }

    let years = groups.len();
    let archive = ArchiveTemplate {
        site: site.clone(),
        years: groups,
    };
    let html = archive.render().context("Failed to render archive")?;
    write_file(output_dir, "archive/index.html", &html)?;

    Ok(years + 1)
}

/// One post in posts.json
#[derive(Serialize)]
struct PostRecord<'a> {
    path: &'a str,
    slug: &'a str,
    url: String,
    title: &'a str,
    date: Option<String>,
    tags: &'a [String],
    description: &'a str,
}

/// Generate posts.json, a machine-readable listing in site order
fn generate_posts_json(output_dir: &Path, site: &SiteMeta, index: &SiteIndex) -> Result<()> {
    let records: Vec<PostRecord> = index
        .documents()
        .iter()
        .map(|doc| PostRecord {
            path: &doc.path,
            slug: &doc.slug,
            url: doc.url_with_base(&site.base_url),
            title: &doc.title,
            date: doc.date_string(),
            tags: &doc.tags,
            description: doc.blurb(),
        })
        .collect();

    let json = serde_json::to_string_pretty(&records).context("Failed to serialize posts")?;
    write_file(output_dir, "posts.json", &json)?;

    tracing::info!("Generated posts.json with {} entries", records.len());
    Ok(())
}

fn extract_embedded_static(dest: &Path) -> Result<()> {
    for entry in STATIC_ASSETS.entries() {
        extract_entry(entry, dest)?;
    }
    Ok(())
}

fn extract_entry(entry: &include_dir::DirEntry, dest: &Path) -> Result<()> {
    match entry {
        include_dir::DirEntry::Dir(dir) => {
            for sub_entry in dir.entries() {
                extract_entry(sub_entry, dest)?;
            }
        }
        include_dir::DirEntry::File(file) => {
            let target = dest.join(file.path());
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&target, file.contents())
                .with_context(|| format!("Failed to write embedded static file to {:?}", target))?;
        }
    }
    Ok(())
}
