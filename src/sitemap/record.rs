//! URL records: the uniform shape every sitemap entry is reduced to.
//!
//! Pure mapping, no I/O. Static routes come straight from the configured
//! route table; content rows go through a per-type rule:
//!
//! | type          | path                    | changefreq | priority | lastmod      |
//! |---------------|-------------------------|------------|----------|--------------|
//! | product       | `/product/{id}`         | weekly     | 0.7      | `updated_at` |
//! | brand         | `/brand/{slug}`         | monthly    | 0.6      | `updated_at` |
//! | blog post     | `/blog/{slug}`          | monthly    | 0.6      | `updated_at` |
//! | blog category | `/blog?category={slug}` | weekly     | 0.5      | none         |
//! | custom page   | `/{slug}`               | monthly    | 0.5      | `updated_at` |

use crate::{
    config::RouteConfig,
    source::{Collections, ContentRecord, ContentType},
    utils::date::parse_timestamp,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// Types
// ============================================================================

/// Sitemap `<changefreq>` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFreq {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

/// Single URL entry in a sitemap document.
#[derive(Debug, Clone, PartialEq)]
pub struct UrlRecord {
    /// Site-relative path, always starting with `/`.
    pub path: String,
    /// Omitted from output when `None`.
    pub last_modified: Option<DateTime<Utc>>,
    pub change_frequency: ChangeFreq,
    /// Within `0.0..=1.0`.
    pub priority: f64,
}

impl UrlRecord {
    /// Record for a static route.
    pub fn from_route(route: &RouteConfig) -> Self {
        Self {
            path: route.path.clone(),
            last_modified: None,
            change_frequency: route.changefreq,
            priority: route.priority,
        }
    }

    /// Record for a fetched content row.
    ///
    /// Fails only on an `updated_at` that is present but unparseable.
    pub fn from_content(kind: ContentType, record: &ContentRecord) -> Result<Self> {
        let (change_frequency, priority) = content_defaults(kind);
        let path = content_path(kind, &record.key);

        let last_modified = match (&record.updated_at, kind.has_updated_at()) {
            (Some(raw), true) => Some(
                parse_timestamp(raw).with_context(|| format!("invalid updated_at for {path}"))?,
            ),
            _ => None,
        };

        Ok(Self {
            path,
            last_modified,
            change_frequency,
            priority,
        })
    }
}

// ============================================================================
// Per-type Rules
// ============================================================================

/// `(changefreq, priority)` for a content type.
pub const fn content_defaults(kind: ContentType) -> (ChangeFreq, f64) {
    match kind {
        ContentType::Product => (ChangeFreq::Weekly, 0.7),
        ContentType::Brand => (ChangeFreq::Monthly, 0.6),
        ContentType::BlogPost => (ChangeFreq::Monthly, 0.6),
        ContentType::BlogCategory => (ChangeFreq::Weekly, 0.5),
        ContentType::Page => (ChangeFreq::Monthly, 0.5),
    }
}

/// Public path for a content row.
pub fn content_path(kind: ContentType, key: &str) -> String {
    match kind {
        ContentType::Product => format!("/product/{key}"),
        ContentType::Brand => format!("/brand/{key}"),
        ContentType::BlogPost => format!("/blog/{key}"),
        ContentType::BlogCategory => format!("/blog?category={key}"),
        ContentType::Page => format!("/{}", key.trim_start_matches('/')),
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Records for every static route, in table order.
pub fn route_records(routes: &[RouteConfig]) -> Vec<UrlRecord> {
    routes.iter().map(UrlRecord::from_route).collect()
}

/// Records for one collection, in backend order.
pub fn content_records(kind: ContentType, records: &[ContentRecord]) -> Result<Vec<UrlRecord>> {
    records
        .iter()
        .map(|record| UrlRecord::from_content(kind, record))
        .collect()
}

/// Static routes followed by every collection in [`ContentType::ALL`] order.
pub fn build_records(routes: &[RouteConfig], collections: &Collections) -> Result<Vec<UrlRecord>> {
    let mut urls = route_records(routes);
    urls.reserve(collections.total());

    for (kind, records) in collections.iter() {
        urls.extend(content_records(kind, records)?);
    }

    Ok(urls)
}

/// Keep the first record for each path, preserving order.
pub fn dedupe_by_path(records: Vec<UrlRecord>) -> Vec<UrlRecord> {
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(record.path.clone()))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
