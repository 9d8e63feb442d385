//! Content fetching from the storefront backend.
//!
//! # Architecture
//!
//! ```text
//! fetch_all(source)
//!     │
//!     ├── products ────────┐
//!     ├── brands ──────────┤
//!     ├── blog_posts ──────┼── rayon, fail-fast ──► Collections
//!     ├── blog_categories ─┤
//!     └── pages ───────────┘
//! ```
//!
//! The pipeline only sees the [`ContentSource`] trait, so tests swap the
//! HTTP-backed [`RestSource`] for an in-memory fake.

mod rest;

pub use rest::RestSource;

use rayon::prelude::*;
use std::fmt;
use thiserror::Error;

// ============================================================================
// Content Types
// ============================================================================

/// Publicly listed content collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Product,
    Brand,
    BlogPost,
    BlogCategory,
    Page,
}

impl ContentType {
    /// All collections, in sitemap concatenation order.
    pub const ALL: [Self; 5] = [
        Self::Product,
        Self::Brand,
        Self::BlogPost,
        Self::BlogCategory,
        Self::Page,
    ];

    /// Backend table name.
    pub const fn table(self) -> &'static str {
        match self {
            Self::Product => "products",
            Self::Brand => "brands",
            Self::BlogPost => "blog_posts",
            Self::BlogCategory => "blog_categories",
            Self::Page => "pages",
        }
    }

    /// Column used to build the public path.
    pub const fn key_column(self) -> &'static str {
        match self {
            Self::Product => "id",
            _ => "slug",
        }
    }

    /// Whether the collection carries an `updated_at` column worth projecting.
    pub const fn has_updated_at(self) -> bool {
        !matches!(self, Self::BlogCategory)
    }

    /// Projected columns, comma-separated.
    pub fn columns(self) -> String {
        if self.has_updated_at() {
            format!("{},updated_at", self.key_column())
        } else {
            self.key_column().to_string()
        }
    }

    /// Equality filter selecting publicly visible rows: `(column, value)`.
    pub const fn visibility_filter(self) -> (&'static str, &'static str) {
        match self {
            Self::Product | Self::Brand | Self::BlogCategory => ("is_active", "true"),
            Self::BlogPost => ("status", "published"),
            Self::Page => ("is_published", "true"),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

// ============================================================================
// Records & Errors
// ============================================================================

/// One visible row, reduced to what the sitemap needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    /// Product id or slug.
    pub key: String,
    /// Raw `updated_at` value, if the row has one.
    pub updated_at: Option<String>,
}

#[cfg(test)]
impl ContentRecord {
    pub fn new(key: impl Into<String>, updated_at: Option<&str>) -> Self {
        Self {
            key: key.into(),
            updated_at: updated_at.map(str::to_string),
        }
    }
}

/// Failure fetching one collection.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to fetch {kind}: {message}")]
    Backend { kind: ContentType, message: String },

    #[error("failed to fetch {kind}")]
    Transport {
        kind: ContentType,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to fetch {kind}: row without usable `{column}`")]
    MalformedRow {
        kind: ContentType,
        column: &'static str,
    },
}

#[cfg(test)]
impl FetchError {
    pub const fn kind(&self) -> ContentType {
        match self {
            Self::Backend { kind, .. }
            | Self::Transport { kind, .. }
            | Self::MalformedRow { kind, .. } => *kind,
        }
    }
}

// ============================================================================
// Source Trait
// ============================================================================

/// Data-access interface over the content collections.
pub trait ContentSource: Send + Sync {
    /// Fetch the visible rows of one collection, in backend order.
    fn fetch(&self, kind: ContentType) -> Result<Vec<ContentRecord>, FetchError>;
}

/// Rows of every collection, indexed by [`ContentType`].
#[derive(Debug, Clone, Default)]
pub struct Collections {
    items: Vec<(ContentType, Vec<ContentRecord>)>,
}

impl Collections {
    pub fn get(&self, kind: ContentType) -> &[ContentRecord] {
        self.items
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, records)| records.as_slice())
            .unwrap_or_default()
    }

    pub fn total(&self) -> usize {
        self.items.iter().map(|(_, records)| records.len()).sum()
    }

    /// Iterate collections in [`ContentType::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (ContentType, &[ContentRecord])> {
        self.items.iter().map(|(k, r)| (*k, r.as_slice()))
    }
}

impl FromIterator<(ContentType, Vec<ContentRecord>)> for Collections {
    fn from_iter<I: IntoIterator<Item = (ContentType, Vec<ContentRecord>)>>(iter: I) -> Self {
        let mut items: Vec<_> = iter.into_iter().collect();
        items.sort_by_key(|(k, _)| ContentType::ALL.iter().position(|t| t == k));
        Self { items }
    }
}

/// Fetch every collection concurrently.
///
/// Any single failure fails the whole call; partial results are dropped.
pub fn fetch_all(source: &dyn ContentSource) -> Result<Collections, FetchError> {
    ContentType::ALL
        .par_iter()
        .map(|&kind| source.fetch(kind).map(|records| (kind, records)))
        .collect::<Result<Vec<_>, _>>()
        .map(|items| items.into_iter().collect())
}

// ============================================================================
// Test Support
// ============================================================================

#[cfg(test)]
pub mod fake {
    use super::*;
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
    };

    /// In-memory source counting the queries it receives.
    #[derive(Default)]
    pub struct MemorySource {
        rows: HashMap<ContentType, Vec<ContentRecord>>,
        failing: Option<(ContentType, String)>,
        calls: AtomicUsize,
    }

    impl MemorySource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, kind: ContentType, rows: Vec<ContentRecord>) -> Self {
            self.rows.insert(kind, rows);
            self
        }

        pub fn failing(mut self, kind: ContentType, message: &str) -> Self {
            self.failing = Some((kind, message.to_string()));
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ContentSource for MemorySource {
        fn fetch(&self, kind: ContentType) -> Result<Vec<ContentRecord>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some((failing, message)) = &self.failing
                && *failing == kind
            {
                return Err(FetchError::Backend {
                    kind,
                    message: message.clone(),
                });
            }
            Ok(self.rows.get(&kind).cloned().unwrap_or_default())
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
