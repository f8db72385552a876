//! Syndication artifacts: RSS feed and sitemap.
//!
//! Neither embeds the build time, so unchanged input yields identical files.

use blogsmith_core::{Config, SiteIndex};
use chrono::NaiveDateTime;

/// Generate an RSS 2.0 feed of all published posts, newest first
pub fn rss(config: &Config, index: &SiteIndex) -> String {
    let base_url = config.normalized_base_url();
    let mut items = String::new();

    for doc in index.documents() {
        let link = absolute_url(&config.site.url, &base_url, &doc.output_rel_path());

        items.push_str(&format!(
            "    <item>\n      <title>{}</title>\n      <link>{}</link>\n      <guid>{}</guid>\n      <description>{}</description>\n",
            escape_xml(&doc.title),
            escape_xml(&link),
            escape_xml(&link),
            escape_xml(doc.blurb())
        ));
        for tag in &doc.tags {
            items.push_str(&format!("      <category>{}</category>\n", escape_xml(tag)));
        }
        if let Some(date) = doc.date {
            items.push_str(&format!("      <pubDate>{}</pubDate>\n", rfc2822(&date)));
        }
        items.push_str("    </item>\n");
    }

    let channel_link = absolute_url(&config.site.url, &base_url, "");
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>{}</title>
    <link>{}</link>
    <description>{}</description>
{}  </channel>
</rss>
"#,
        escape_xml(&config.site.title),
        escape_xml(&channel_link),
        escape_xml(&config.site.description),
        items
    )
}

/// Generate sitemap.xml covering the home page and every post
pub fn sitemap(config: &Config, index: &SiteIndex) -> String {
    let base_url = config.normalized_base_url();
    let mut urls = String::new();

    urls.push_str(&format!(
        "  <url><loc>{}</loc></url>\n",
        escape_xml(&absolute_url(&config.site.url, &base_url, "index.html"))
    ));

    for doc in index.documents() {
        let loc = absolute_url(&config.site.url, &base_url, &doc.output_rel_path());
        urls.push_str(&format!("  <url><loc>{}</loc>", escape_xml(&loc)));
        if let Some(date) = doc.updated.or(doc.date) {
            urls.push_str(&format!("<lastmod>{}</lastmod>", date.format("%Y-%m-%d")));
        }
        urls.push_str("</url>\n");
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}</urlset>
"#,
        urls
    )
}

fn absolute_url(site_url: &str, base_url: &str, rel: &str) -> String {
    let root = site_url.trim_end_matches('/');
    let base = base_url.trim_matches('/');
    let rel = rel.trim_start_matches('/');

    let mut url = root.to_string();
    for part in [base, rel] {
        if !part.is_empty() {
            url.push('/');
            url.push_str(part);
        }
    }
    if url.is_empty() {
        url.push('/');
    }
    url
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn rfc2822(date: &NaiveDateTime) -> String {
    date.and_utc().to_rfc2822()
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogsmith_core::SiteBuilder;

    #[test]
    fn test_absolute_url() {
        assert_eq!(
            absolute_url("https://example.com/", "/", "a/b.html"),
            "https://example.com/a/b.html"
        );
        assert_eq!(
            absolute_url("https://example.com", "/blog/", "post.html"),
            "https://example.com/blog/post.html"
        );
        assert_eq!(
            absolute_url("https://example.com", "/blog/", ""),
            "https://example.com/blog"
        );
        assert_eq!(absolute_url("", "/", "x.html"), "/x.html");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a & <b>"), "a &amp; &lt;b&gt;");
    }

    #[test]
    fn test_feeds_list_published_posts() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("posts");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(
            input.join("one.md"),
            "---\ntitle: One & Only\ndate: 2020-01-02\ntags: [swift]\n---\nBody\n",
        )
        .unwrap();
        std::fs::write(
            input.join("hidden.md"),
            "---\ntitle: Hidden\npublished: false\n---\nBody\n",
        )
        .unwrap();

        let mut config = Config::from_dirs(&input, dir.path().join("out"));
        config.site.url = "https://example.com".into();
        let site = SiteBuilder::new(config.clone()).build().unwrap();

        let feed = rss(&config, &site.index);
        assert!(feed.contains("<title>One &amp; Only</title>"));
        assert!(feed.contains("<link>https://example.com/one.html</link>"));
        assert!(feed.contains("<category>swift</category>"));
        assert!(feed.contains("2 Jan 2020 00:00:00 +0000</pubDate>"));
        assert!(!feed.contains("Hidden"));

        let map = sitemap(&config, &site.index);
        assert!(map.contains("<loc>https://example.com/one.html</loc><lastmod>2020-01-02</lastmod>"));
        assert!(!map.contains("hidden"));
    }
}
