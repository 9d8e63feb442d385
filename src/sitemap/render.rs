//! Sitemap protocol serialization.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://shop.example.com/product/abc123</loc>
//!     <lastmod>2024-01-15T10:00:00.000Z</lastmod>
//!     <changefreq>weekly</changefreq>
//!     <priority>0.7</priority>
//!   </url>
//! </urlset>
//! ```
//!
//! # Index Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <sitemap>
//!     <loc>https://shop.example.com/sitemaps/sitemap-products.xml.gz</loc>
//!     <lastmod>2025-01-01</lastmod>
//!   </sitemap>
//! </sitemapindex>
//! ```

use super::UrlRecord;
use crate::utils::date::{format_date, format_lastmod};
use chrono::NaiveDate;
use quick_xml::escape::escape;

// ============================================================================
// Constants
// ============================================================================

/// XML namespace for sitemap
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

// ============================================================================
// Index Entries
// ============================================================================

/// One `<sitemap>` entry of an index document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Absolute URL of the shard file.
    pub location: String,
    pub last_modified: NaiveDate,
}

// ============================================================================
// Public API
// ============================================================================

/// Render a `<urlset>` document, prefixing every path with `site_url`.
pub fn render_urlset(records: &[UrlRecord], site_url: &str) -> String {
    let site_url = site_url.trim_end_matches('/');
    let mut xml = String::with_capacity(256 + records.len() * 160);

    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(&format!(r#"<urlset xmlns="{SITEMAP_NS}">"#));
    xml.push('\n');

    for record in records {
        let loc = format!("{site_url}{}", record.path);
        xml.push_str("  <url>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape(&loc)));
        if let Some(lastmod) = &record.last_modified {
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", format_lastmod(lastmod)));
        }
        xml.push_str(&format!(
            "    <changefreq>{}</changefreq>\n",
            record.change_frequency.as_str()
        ));
        xml.push_str(&format!("    <priority>{}</priority>\n", record.priority));
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}

/// Render a `<sitemapindex>` document.
pub fn render_index(entries: &[IndexEntry]) -> String {
    let mut xml = String::with_capacity(256 + entries.len() * 128);

    xml.push_str(XML_DECLARATION);
    xml.push('\n');
    xml.push_str(&format!(r#"<sitemapindex xmlns="{SITEMAP_NS}">"#));
    xml.push('\n');

    for entry in entries {
        xml.push_str("  <sitemap>\n");
        xml.push_str(&format!("    <loc>{}</loc>\n", escape(&entry.location)));
        xml.push_str(&format!(
            "    <lastmod>{}</lastmod>\n",
            format_date(&entry.last_modified)
        ));
        xml.push_str("  </sitemap>\n");
    }

    xml.push_str("</sitemapindex>\n");
    xml
}

// ============================================================================
// Tests
// ============================================================================
