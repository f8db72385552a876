//! Tags command: print the tag index.

use anyhow::{Context, Result};
use blogsmith_core::{Config, SiteBuilder};
use serde::Serialize;

#[derive(Serialize)]
struct TagPost<'a> {
    path: &'a str,
    title: &'a str,
    date: Option<String>,
}

pub fn list_tags(config: Config, json: bool) -> Result<()> {
    let site = SiteBuilder::new(config)
        .build()
        .context("Failed to build site")?;

    if json {
        let tags: serde_json::Map<String, serde_json::Value> = site
            .index
            .tags()
            .map(|(tag, docs)| {
                let posts: Vec<TagPost> = docs
                    .iter()
                    .map(|doc| TagPost {
                        path: &doc.path,
                        title: &doc.title,
                        date: doc.date_string(),
                    })
                    .collect();
                Ok((tag.to_string(), serde_json::to_value(posts)?))
            })
            .collect::<Result<_, serde_json::Error>>()
            .context("Failed to serialize tag index")?;
        println!("{}", serde_json::to_string_pretty(&tags)?);
        return Ok(());
    }

    if site.index.tags().next().is_none() {
        println!("No tags.");
        return Ok(());
    }

    for (tag, docs) in site.index.tags() {
        println!("{} ({})", tag, docs.len());
        for doc in docs {
            println!(
                "  {}  {}",
                doc.date_string().unwrap_or_else(|| "----------".to_string()),
                doc.title
            );
        }
    }
    Ok(())
}
