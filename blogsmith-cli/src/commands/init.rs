//! Init command implementation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = include_str!("../../../blogsmith.yml.example");

/// Scaffold blogsmith.yml and a first post
pub fn init_project(path: Option<&Path>) -> Result<()> {
    let root = path.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(root).with_context(|| format!("Failed to create {:?}", root))?;

    write_config(root)?;
    scaffold_posts(root)?;

    println!("✓ blogsmith initialized in {:?}", root);
    println!("  - Edit blogsmith.yml to customize site metadata");
    println!("  - Write posts in _posts/, then run `blogsmith build`");
    Ok(())
}

fn write_config(root: &Path) -> Result<()> {
    let config_path = root.join(super::DEFAULT_CONFIG_FILE);
    if config_path.exists() {
        println!("{} already exists at {:?}", super::DEFAULT_CONFIG_FILE, config_path);
        return Ok(());
    }

    fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {:?}", config_path))?;
    println!("Created {:?}", config_path);
    Ok(())
}

fn scaffold_posts(root: &Path) -> Result<()> {
    let posts = root.join("_posts");
    fs::create_dir_all(&posts).with_context(|| format!("Failed to create {:?}", posts))?;

    let today = chrono::Local::now().date_naive();
    let sample = posts.join(format!("{}-welcome.md", today.format("%Y-%m-%d")));
    if !sample.exists() {
        fs::write(&sample, sample_post(&today.format("%Y-%m-%d").to_string()))
            .with_context(|| format!("Failed to write {:?}", sample))?;
        println!("Created {:?}", sample);
    }

    Ok(())
}

fn sample_post(date: &str) -> String {
    format!(
        r#"---
layout: post
title: Welcome to blogsmith
date: {date}
tags: [blogsmith, intro]
description: Quick start guide
---

# Welcome

Posts live in `_posts/` as markdown with a YAML front matter block. Build the site with:

```bash
blogsmith build
```

Set `published: false` to keep a post out of the generated site.
"#
    )
}
