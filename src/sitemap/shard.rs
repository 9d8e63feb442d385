//! Sharded sitemap output.
//!
//! One document per content group, optionally gzipped, plus an index that
//! crawlers start from:
//!
//! ```text
//! public/
//! ├── sitemap-index.xml
//! └── sitemaps/
//!     ├── sitemap-products.xml.gz
//!     ├── sitemap-categories.xml.gz
//!     ├── sitemap-brands.xml.gz
//!     ├── sitemap-blog.xml.gz
//!     ├── sitemap-pages.xml.gz
//!     └── sitemap-static.xml.gz
//! ```
//!
//! Shard contents come from a [`ShardSource`], so callers can feed any
//! per-shard record sequence. [`GroupedShards`] is the default, built from
//! the fetched collections.

use super::{
    IndexEntry, UrlRecord, content_records, dedupe_by_path, render_index, render_urlset,
    route_records,
};
use crate::{
    config::{RouteConfig, SiteConfig},
    log,
    source::{Collections, ContentType},
    utils::minify::minify_xml,
};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use flate2::{Compression, write::GzEncoder};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

/// File name of the index document inside the output directory.
pub const INDEX_FILE: &str = "sitemap-index.xml";

// ============================================================================
// Shards
// ============================================================================

/// Declared shard names, in index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shard {
    Products,
    Categories,
    Brands,
    Blog,
    Pages,
    Static,
}

impl Shard {
    pub const ALL: [Self; 6] = [
        Self::Products,
        Self::Categories,
        Self::Brands,
        Self::Blog,
        Self::Pages,
        Self::Static,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Categories => "categories",
            Self::Brands => "brands",
            Self::Blog => "blog",
            Self::Pages => "pages",
            Self::Static => "static",
        }
    }

    /// Collection backing this shard; `None` for the static route table.
    pub const fn content_type(self) -> Option<ContentType> {
        match self {
            Self::Products => Some(ContentType::Product),
            Self::Categories => Some(ContentType::BlogCategory),
            Self::Brands => Some(ContentType::Brand),
            Self::Blog => Some(ContentType::BlogPost),
            Self::Pages => Some(ContentType::Page),
            Self::Static => None,
        }
    }

    /// `sitemap-{name}.xml`, with `.gz` appended when compressed.
    pub fn file_name(self, gzip: bool) -> String {
        let ext = if gzip { "xml.gz" } else { "xml" };
        format!("sitemap-{}.{ext}", self.name())
    }
}

/// Supplies the records of each shard.
pub trait ShardSource {
    fn shard_records(&self, shard: Shard) -> Result<Vec<UrlRecord>>;
}

/// Default [`ShardSource`]: fetched collections grouped by type.
pub struct GroupedShards<'a> {
    routes: &'a [RouteConfig],
    collections: &'a Collections,
}

impl<'a> GroupedShards<'a> {
    pub const fn new(routes: &'a [RouteConfig], collections: &'a Collections) -> Self {
        Self {
            routes,
            collections,
        }
    }
}

impl ShardSource for GroupedShards<'_> {
    fn shard_records(&self, shard: Shard) -> Result<Vec<UrlRecord>> {
        match shard.content_type() {
            Some(kind) => content_records(kind, self.collections.get(kind)),
            None => Ok(route_records(self.routes)),
        }
    }
}

// ============================================================================
// Writer
// ============================================================================

/// Write every shard and the index. Returns the written paths, index last.
///
/// Shard records are collected before anything touches the disk, so a failing
/// hook leaves the output directory as it was.
pub fn write_shards(
    config: &SiteConfig,
    source: &dyn ShardSource,
    today: NaiveDate,
) -> Result<Vec<PathBuf>> {
    let sitemap = &config.sitemap;
    let shard_dir = sitemap.output.join(&sitemap.shard_dir);
    let url_dir = url_segment(&sitemap.shard_dir);

    let shards = Shard::ALL
        .iter()
        .map(|&shard| {
            let records = source
                .shard_records(shard)
                .with_context(|| format!("Failed to collect `{}` shard", shard.name()))?;
            Ok((shard, records))
        })
        .collect::<Result<Vec<_>>>()?;

    fs::create_dir_all(&shard_dir)
        .with_context(|| format!("Failed to create {}", shard_dir.display()))?;

    let mut written = Vec::with_capacity(Shard::ALL.len() + 1);
    let mut entries = Vec::with_capacity(Shard::ALL.len());

    for (shard, records) in shards {
        let records = if sitemap.dedupe {
            dedupe_by_path(records)
        } else {
            records
        };
        let xml = render_urlset(&records, &config.site.url);
        let xml = minify_xml(&xml, sitemap.minify);

        let xml_path = shard_dir.join(shard.file_name(false));
        fs::write(&xml_path, xml.as_bytes())
            .with_context(|| format!("Failed to write {}", xml_path.display()))?;

        let path = if sitemap.gzip {
            gzip_file(&xml_path)?
        } else {
            xml_path
        };

        log!("sitemap"; "{} ({} urls)", shard.file_name(sitemap.gzip), records.len());

        let file_name = shard.file_name(sitemap.gzip);
        let location = if url_dir.is_empty() {
            config.site.absolute(&format!("/{file_name}"))
        } else {
            config.site.absolute(&format!("/{url_dir}/{file_name}"))
        };
        entries.push(IndexEntry {
            location,
            last_modified: today,
        });
        written.push(path);
    }

    let index_path = sitemap.output.join(INDEX_FILE);
    let index = render_index(&entries);
    let index = minify_xml(&index, sitemap.minify);
    fs::write(&index_path, index.as_bytes())
        .with_context(|| format!("Failed to write sitemap index to {}", index_path.display()))?;
    log!("sitemap"; "{INDEX_FILE}");
    written.push(index_path);

    Ok(written)
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Compress `path` to `path.gz` and delete the original.
fn gzip_file(path: &Path) -> Result<PathBuf> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    let mut encoder = GzEncoder::new(Vec::with_capacity(data.len() / 4), Compression::best());
    encoder.write_all(&data)?;
    let compressed = encoder.finish()?;

    let mut gz_path = path.as_os_str().to_owned();
    gz_path.push(".gz");
    let gz_path = PathBuf::from(gz_path);

    fs::write(&gz_path, compressed)
        .with_context(|| format!("Failed to write {}", gz_path.display()))?;
    fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;

    Ok(gz_path)
}

/// Shard directory as a URL path segment (forward slashes, no edges).
fn url_segment(dir: &Path) -> String {
    dir.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
        .trim_matches('/')
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        sitemap::ChangeFreq,
        source::ContentRecord,
    };
    use flate2::read::GzDecoder;
    use std::io::Read;

    fn test_config(output: &Path) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.site.url = "https://shop.example.com".into();
        config.sitemap.output = output.to_path_buf();
        config.sitemap.sharded = true;
        config
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 9).unwrap()
    }

    fn sample_collections() -> Collections {
        vec![
            (
                ContentType::Product,
                vec![
                    ContentRecord::new("abc123", Some("2024-01-15T10:00:00Z")),
                    ContentRecord::new("def456", None),
                ],
            ),
            (ContentType::BlogCategory, vec![ContentRecord::new("guides", None)]),
            (ContentType::Brand, vec![ContentRecord::new("acme", None)]),
        ]
        .into_iter()
        .collect()
    }

    fn gunzip(path: &Path) -> String {
        let mut out = String::new();
        GzDecoder::new(fs::File::open(path).unwrap())
            .read_to_string(&mut out)
            .unwrap();
        out
    }

    /// Hook returning one record per shard.
    struct OnePerShard;

    impl ShardSource for OnePerShard {
        fn shard_records(&self, shard: Shard) -> Result<Vec<UrlRecord>> {
            Ok(vec![UrlRecord {
                path: format!("/{}-sample", shard.name()),
                last_modified: None,
                change_frequency: ChangeFreq::Weekly,
                priority: 0.5,
            }])
        }
    }

    struct Failing;

    impl ShardSource for Failing {
        fn shard_records(&self, shard: Shard) -> Result<Vec<UrlRecord>> {
            if shard == Shard::Pages {
                anyhow::bail!("pages unavailable");
            }
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_shard_file_names() {
        assert_eq!(Shard::Products.file_name(true), "sitemap-products.xml.gz");
        assert_eq!(Shard::Static.file_name(false), "sitemap-static.xml");
    }

    #[test]
    fn test_grouped_shards() {
        let routes = vec![RouteConfig {
            path: "/".into(),
            changefreq: ChangeFreq::Daily,
            priority: 1.0,
        }];
        let collections = sample_collections();
        let grouped = GroupedShards::new(&routes, &collections);

        let products = grouped.shard_records(Shard::Products).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].path, "/product/abc123");

        let categories = grouped.shard_records(Shard::Categories).unwrap();
        assert_eq!(categories[0].path, "/blog?category=guides");

        assert!(grouped.shard_records(Shard::Blog).unwrap().is_empty());
        assert_eq!(grouped.shard_records(Shard::Static).unwrap()[0].path, "/");
    }

    #[test]
    fn test_write_shards_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let written = write_shards(&config, &OnePerShard, today()).unwrap();

        assert_eq!(written.len(), 7);
        let shard_dir = dir.path().join("sitemaps");
        for shard in Shard::ALL {
            let gz = shard_dir.join(shard.file_name(true));
            assert!(gz.is_file(), "{}", gz.display());
            assert!(!shard_dir.join(shard.file_name(false)).exists());

            let xml = gunzip(&gz);
            assert!(xml.contains(&format!("/{}-sample</loc>", shard.name())));
        }

        let index = fs::read_to_string(dir.path().join(INDEX_FILE)).unwrap();
        assert_eq!(index.matches("<sitemap>").count(), 6);
        assert!(index.contains(
            "<loc>https://shop.example.com/sitemaps/sitemap-products.xml.gz</loc>"
        ));
        assert!(index.contains("<lastmod>2025-03-09</lastmod>"));

        // index lists shards in declaration order
        let positions: Vec<_> = Shard::ALL
            .iter()
            .map(|s| index.find(&s.file_name(true)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_write_shards_plain() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.sitemap.gzip = false;

        let routes = config.sitemap.routes.clone();
        let collections = sample_collections();
        write_shards(&config, &GroupedShards::new(&routes, &collections), today()).unwrap();

        let products =
            fs::read_to_string(dir.path().join("sitemaps/sitemap-products.xml")).unwrap();
        assert!(products.contains("<loc>https://shop.example.com/product/abc123</loc>"));
        assert!(products.contains("<lastmod>2024-01-15T10:00:00.000Z</lastmod>"));

        let index = fs::read_to_string(dir.path().join(INDEX_FILE)).unwrap();
        assert!(index.contains("/sitemaps/sitemap-static.xml</loc>"));
    }

    #[test]
    fn test_write_shards_failing_hook_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let err = write_shards(&config, &Failing, today()).unwrap_err();

        assert!(format!("{err:#}").contains("pages unavailable"));
        assert!(!dir.path().join("sitemaps").exists());
        assert!(!dir.path().join(INDEX_FILE).exists());
    }

    #[test]
    fn test_url_segment() {
        assert_eq!(url_segment(Path::new("sitemaps")), "sitemaps");
        assert_eq!(url_segment(Path::new("seo/maps")), "seo/maps");
        assert_eq!(url_segment(Path::new("")), "");
    }
}
