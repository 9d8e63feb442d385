//! Whitespace minification for rendered XML.
//!
//! Enabled through `[sitemap] minify = true`.

use std::borrow::Cow;

// ============================================================================
// Public API
// ============================================================================

/// Minify XML when `enabled`.
///
/// Returns `Cow::Borrowed` if minify disabled, `Cow::Owned` if minified.
pub fn minify_xml(xml: &str, enabled: bool) -> Cow<'_, str> {
    if enabled {
        Cow::Owned(minify_xml_inner(xml))
    } else {
        Cow::Borrowed(xml)
    }
}

// ============================================================================
// Internal Implementation
// ============================================================================

/// Minify XML by removing indentation and line breaks between elements.
fn minify_xml_inner(xml: &str) -> String {
    xml.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("")
}

// ============================================================================
// Tests
// ============================================================================
