//! Sitemap pipeline orchestration.
//!
//! # Architecture
//!
//! ```text
//! Generator::write()
//!     │
//!     ├── fetch_all() ──► Collections      (fail-fast, nothing written yet)
//!     │
//!     ├── single:  build_records() ──► render_urlset() ──► sitemap.xml
//!     │   sharded: GroupedShards ──► write_shards() ──► sitemaps/*.xml.gz
//!     │                                                 sitemap-index.xml
//!     │
//!     └── write_robots() ──► robots.txt
//! ```

use crate::{
    config::SiteConfig,
    log,
    robots::write_robots,
    sitemap::{GroupedShards, ShardSource, build_records, dedupe_by_path, render_urlset, write_shards},
    source::{Collections, ContentSource, fetch_all},
    utils::{date::today, minify::minify_xml},
};
use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

/// File name of the single-document sitemap inside the output directory.
pub const SITEMAP_FILE: &str = "sitemap.xml";

/// File name of the robots file inside the output directory.
pub const ROBOTS_FILE: &str = "robots.txt";

/// Runs the pipeline against an injected content source.
pub struct Generator<'a> {
    config: &'a SiteConfig,
    source: &'a dyn ContentSource,
}

impl<'a> Generator<'a> {
    pub const fn new(config: &'a SiteConfig, source: &'a dyn ContentSource) -> Self {
        Self { config, source }
    }

    /// Fetch every collection, logging per-type counts.
    fn fetch(&self) -> Result<Collections> {
        let collections = fetch_all(self.source)?;
        for (kind, records) in collections.iter() {
            log!("fetch"; "{kind}: {}", records.len());
        }
        Ok(collections)
    }

    /// Render the single-document sitemap from fresh data.
    pub fn render(&self) -> Result<String> {
        let collections = self.fetch()?;
        self.render_collections(&collections)
    }

    fn render_collections(&self, collections: &Collections) -> Result<String> {
        let sitemap = &self.config.sitemap;
        let mut records = build_records(&sitemap.routes, collections)?;
        if sitemap.dedupe {
            records = dedupe_by_path(records);
        }

        let xml = render_urlset(&records, &self.config.site.url);
        Ok(minify_xml(&xml, sitemap.minify).into_owned())
    }

    /// Generate output files into the public-assets directory.
    ///
    /// Returns every written path, robots.txt last when enabled.
    pub fn write(&self) -> Result<Vec<PathBuf>> {
        let collections = self.fetch()?;

        let mut written = if self.config.sitemap.sharded {
            let grouped = GroupedShards::new(&self.config.sitemap.routes, &collections);
            self.write_sharded(&grouped)?
        } else {
            vec![self.write_single(&collections)?]
        };

        if self.config.sitemap.robots {
            let robots = self.config.sitemap.output.join(ROBOTS_FILE);
            write_robots(&robots, &self.config.sitemap_url())?;
            written.push(robots);
        }

        Ok(written)
    }

    /// Write shards supplied by `shards` plus the index document.
    pub fn write_sharded(&self, shards: &dyn ShardSource) -> Result<Vec<PathBuf>> {
        write_shards(self.config, shards, today())
    }

    fn write_single(&self, collections: &Collections) -> Result<PathBuf> {
        let xml = self.render_collections(collections)?;
        let output = &self.config.sitemap.output;

        fs::create_dir_all(output)
            .with_context(|| format!("Failed to create {}", output.display()))?;

        let path = output.join(SITEMAP_FILE);
        fs::write(&path, xml)
            .with_context(|| format!("Failed to write sitemap to {}", path.display()))?;

        log!("sitemap"; "{SITEMAP_FILE}");
        Ok(path)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::RouteConfig,
        sitemap::{ChangeFreq, INDEX_FILE, Shard},
        source::{ContentRecord, ContentType, fake::MemorySource},
    };
    use std::path::Path;

    fn test_config(output: &Path) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.site.url = "https://shop.example.com".into();
        config.sitemap.output = output.to_path_buf();
        config
    }

    fn storefront() -> MemorySource {
        MemorySource::new()
            .with(
                ContentType::Product,
                vec![ContentRecord::new("abc123", Some("2024-01-15T10:00:00Z"))],
            )
            .with(
                ContentType::Brand,
                vec![ContentRecord::new("acme", Some("2024-02-01T08:30:00+00:00"))],
            )
            .with(ContentType::BlogPost, vec![ContentRecord::new("spring-lookbook", None)])
            .with(ContentType::BlogCategory, vec![ContentRecord::new("guides", None)])
            .with(
                ContentType::Page,
                vec![ContentRecord::new("size-guide", Some("2023-12-31"))],
            )
    }

    #[test]
    fn test_render_contains_every_static_route_once() {
        let config = test_config(Path::new("unused"));
        let source = storefront();
        let xml = Generator::new(&config, &source).render().unwrap();

        for route in &config.sitemap.routes {
            let loc = format!("<loc>https://shop.example.com{}</loc>", route.path);
            assert_eq!(xml.matches(&loc).count(), 1, "{}", route.path);
        }
        assert!(xml.contains(
            "<loc>https://shop.example.com/new-arrivals</loc>\n    <changefreq>daily</changefreq>\n    <priority>0.9</priority>"
        ));
    }

    #[test]
    fn test_render_content_records() {
        let config = test_config(Path::new("unused"));
        let source = storefront();
        let xml = Generator::new(&config, &source).render().unwrap();

        assert!(xml.contains("<loc>https://shop.example.com/product/abc123</loc>"));
        assert!(xml.contains("<lastmod>2024-01-15T10:00:00.000Z</lastmod>"));
        assert!(xml.contains("<loc>https://shop.example.com/brand/acme</loc>"));
        assert!(xml.contains("<loc>https://shop.example.com/blog?category=guides</loc>"));
        assert!(xml.contains("<lastmod>2023-12-31T00:00:00.000Z</lastmod>"));
    }

    #[test]
    fn test_render_no_lastmod_without_timestamp() {
        let mut config = test_config(Path::new("unused"));
        config.sitemap.minify = true;
        let source = storefront();
        let xml = Generator::new(&config, &source).render().unwrap();

        let post = xml
            .split("<url>")
            .find(|chunk| chunk.contains("/blog/spring-lookbook"))
            .unwrap();
        assert!(!post.contains("<lastmod>"));
        assert!(post.contains("<changefreq>monthly</changefreq><priority>0.6</priority>"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let config = test_config(Path::new("unused"));
        let source = storefront();
        let generator = Generator::new(&config, &source);

        assert_eq!(generator.render().unwrap(), generator.render().unwrap());
    }

    #[test]
    fn test_render_dedupe() {
        let mut config = test_config(Path::new("unused"));
        config.sitemap.routes = vec![RouteConfig {
            path: "/about".into(),
            changefreq: ChangeFreq::Monthly,
            priority: 0.5,
        }];
        let source =
            MemorySource::new().with(ContentType::Page, vec![ContentRecord::new("about", None)]);

        let xml = Generator::new(&config, &source).render().unwrap();
        assert_eq!(xml.matches("/about</loc>").count(), 2);

        config.sitemap.dedupe = true;
        let xml = Generator::new(&config, &source).render().unwrap();
        assert_eq!(xml.matches("/about</loc>").count(), 1);
    }

    #[test]
    fn test_write_single() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir.path().join("public"));
        let source = storefront();

        let written = Generator::new(&config, &source).write().unwrap();

        let public = dir.path().join("public");
        assert_eq!(written, vec![public.join(SITEMAP_FILE), public.join(ROBOTS_FILE)]);

        let robots = fs::read_to_string(public.join(ROBOTS_FILE)).unwrap();
        assert!(robots.contains("Sitemap: https://shop.example.com/sitemap.xml"));
        assert!(robots.contains("Disallow: /checkout"));
    }

    #[test]
    fn test_write_single_twice_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let source = storefront();
        let generator = Generator::new(&config, &source);

        generator.write().unwrap();
        let first = fs::read(dir.path().join(SITEMAP_FILE)).unwrap();
        let first_robots = fs::read(dir.path().join(ROBOTS_FILE)).unwrap();
        generator.write().unwrap();

        assert_eq!(first, fs::read(dir.path().join(SITEMAP_FILE)).unwrap());
        assert_eq!(first_robots, fs::read(dir.path().join(ROBOTS_FILE)).unwrap());
    }

    #[test]
    fn test_write_sharded_points_robots_at_index() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.sitemap.sharded = true;
        let source = storefront();

        let written = Generator::new(&config, &source).write().unwrap();

        assert_eq!(written.len(), Shard::ALL.len() + 2);
        assert!(dir.path().join(INDEX_FILE).is_file());
        assert!(dir.path().join("sitemaps/sitemap-products.xml.gz").is_file());
        assert!(!dir.path().join(SITEMAP_FILE).exists());

        let robots = fs::read_to_string(dir.path().join(ROBOTS_FILE)).unwrap();
        assert!(robots.contains("Sitemap: https://shop.example.com/sitemap-index.xml"));
    }

    #[test]
    fn test_robots_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.sitemap.robots = false;
        let source = storefront();

        Generator::new(&config, &source).write().unwrap();
        assert!(!dir.path().join(ROBOTS_FILE).exists());
    }

    #[test]
    fn test_fetch_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir.path().join("public"));
        let source = storefront().failing(ContentType::BlogPost, "connection reset");

        let err = Generator::new(&config, &source).write().unwrap_err();

        let message = format!("{err:#}");
        assert!(message.contains("blog_posts"));
        assert!(message.contains("connection reset"));
        assert!(!dir.path().join("public").exists());
    }

    #[test]
    fn test_invalid_timestamp_fails_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let source = MemorySource::new().with(
            ContentType::Product,
            vec![ContentRecord::new("abc123", Some("soon"))],
        );

        assert!(Generator::new(&config, &source).write().is_err());
        assert!(!dir.path().join(SITEMAP_FILE).exists());
    }
}
