//! Check command: parse everything, write nothing.

use anyhow::{bail, Context, Result};
use blogsmith_core::{Config, ErrorPolicy, SiteBuilder};

/// Report every post that fails to parse; error out if there is any
pub fn check_site(mut config: Config) -> Result<()> {
    // Collect all failures rather than stopping at the first one
    config.on_error = ErrorPolicy::Skip;

    let site = SiteBuilder::new(config)
        .build()
        .context("Failed to read posts")?;
    let report = &site.report;

    for skipped in &report.skipped {
        println!("✗ {}: {}", skipped.path, skipped.error);
    }

    println!(
        "{} files, {} published, {} unpublished, {} invalid",
        report.discovered,
        site.index.len(),
        report.unpublished.len(),
        report.skipped.len()
    );

    if !report.skipped.is_empty() {
        bail!("{} post(s) failed to parse", report.skipped.len());
    }
    Ok(())
}
