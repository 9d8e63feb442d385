//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [site] Section Defaults
// ============================================================================

pub mod site {
    pub fn url() -> String {
        "https://www.example.com".into()
    }
}

// ============================================================================
// [backend] Section Defaults
// ============================================================================

pub mod backend {
    pub fn url() -> Option<String> {
        None
    }

    pub fn key() -> Option<String> {
        None
    }

    pub fn timeout_secs() -> u64 {
        30
    }
}

// ============================================================================
// [sitemap] Section Defaults
// ============================================================================

pub mod sitemap {
    use super::super::RouteConfig;
    use crate::sitemap::ChangeFreq;
    use std::path::PathBuf;

    pub fn output() -> PathBuf {
        "public".into()
    }

    pub fn shard_dir() -> PathBuf {
        "sitemaps".into()
    }

    /// Hand-curated storefront routes, shared by every delivery surface.
    pub fn routes() -> Vec<RouteConfig> {
        use ChangeFreq::*;

        [
            ("/", Daily, 1.0),
            ("/products", Daily, 0.9),
            ("/new-arrivals", Daily, 0.9),
            ("/best-sellers", Daily, 0.8),
            ("/sale", Daily, 0.8),
            ("/categories", Weekly, 0.8),
            ("/brands", Weekly, 0.7),
            ("/blog", Daily, 0.7),
            ("/about", Monthly, 0.5),
            ("/contact", Monthly, 0.5),
            ("/faq", Monthly, 0.4),
            ("/shipping", Monthly, 0.4),
            ("/returns", Monthly, 0.4),
            ("/privacy", Yearly, 0.3),
            ("/terms", Yearly, 0.3),
        ]
        .into_iter()
        .map(|(path, changefreq, priority)| RouteConfig {
            path: path.into(),
            changefreq,
            priority,
        })
        .collect()
    }
}

// ============================================================================
// [serve] Section Defaults
// ============================================================================

pub mod serve {
    pub fn interface() -> String {
        "127.0.0.1".into()
    }

    pub fn port() -> u16 {
        5278
    }
}
