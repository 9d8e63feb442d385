//! `[sitemap]` section configuration.
//!
//! Output location, rendering mode and the static route table.

use super::defaults;
use crate::sitemap::ChangeFreq;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[sitemap]` section in shopmap.toml - generation settings.
///
/// # Example
/// ```toml
/// [sitemap]
/// output = "public"
/// sharded = true
/// gzip = true
///
/// [[sitemap.routes]]
/// path = "/new-arrivals"
/// changefreq = "daily"
/// priority = 0.9
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SitemapConfig {
    /// Public-assets directory receiving `sitemap.xml` and `robots.txt`.
    #[serde(default = "defaults::sitemap::output")]
    #[educe(Default = defaults::sitemap::output())]
    pub output: PathBuf,

    /// Directory for shard files, relative to `output`.
    #[serde(default = "defaults::sitemap::shard_dir")]
    #[educe(Default = defaults::sitemap::shard_dir())]
    pub shard_dir: PathBuf,

    /// Split the sitemap into per-type shards referenced by an index.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub sharded: bool,

    /// Gzip shard files (sharded mode only).
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub gzip: bool,

    /// Strip indentation and newlines from rendered XML.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub minify: bool,

    /// Keep only the first record for each path.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub dedupe: bool,

    /// Update `robots.txt` after writing the sitemap.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub robots: bool,

    /// Static storefront routes.
    #[serde(default = "defaults::sitemap::routes")]
    #[educe(Default = defaults::sitemap::routes())]
    pub routes: Vec<RouteConfig>,
}

/// One entry of the static route table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    pub path: String,
    pub changefreq: ChangeFreq,
    pub priority: f64,
}
