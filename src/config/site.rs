//! `[site]` section configuration.
//!
//! Contains the public storefront location used for absolute sitemap URLs.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[site]` section in shopmap.toml - public storefront metadata.
///
/// # Example
/// ```toml
/// [site]
/// url = "https://shop.example.com"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteSection {
    /// Base URL prepended to every sitemap path (`SITE_URL`).
    #[serde(default = "defaults::site::url")]
    #[educe(Default = defaults::site::url())]
    pub url: String,
}

impl SiteSection {
    /// Absolute URL for a site-relative path.
    ///
    /// Trailing slashes on the base are ignored, so `https://a.com/` and
    /// `https://a.com` both yield `https://a.com/path`.
    pub fn absolute(&self, path: &str) -> String {
        format!("{}{path}", self.url.trim_end_matches('/'))
    }
}
