//! robots.txt maintenance.
//!
//! Only the `Sitemap:` directive is owned by this tool. Every other line of
//! an existing file is kept byte-for-byte and in place.

use crate::log;
use anyhow::{Context, Result};
use std::{fs, io::ErrorKind, path::Path};

/// Directive prefix recognized at the start of a line (case-sensitive).
const SITEMAP_DIRECTIVE: &str = "Sitemap:";

/// Paths crawlers are kept out of when the file is first created.
const DISALLOWED: [&str; 4] = ["/admin/", "/account/", "/auth/", "/checkout"];

/// How the robots file was changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotsChange {
    /// No file existed; the default template was written.
    Created,
    /// The first `Sitemap:` line was rewritten.
    Replaced,
    /// No `Sitemap:` line existed; one was appended.
    Appended,
}

// ============================================================================
// Public API
// ============================================================================

/// Compute the new robots.txt content.
pub fn update_robots(existing: Option<&str>, sitemap_url: &str) -> (String, RobotsChange) {
    let directive = format!("{SITEMAP_DIRECTIVE} {sitemap_url}");

    let Some(existing) = existing else {
        return (default_robots(&directive), RobotsChange::Created);
    };

    let mut out = String::with_capacity(existing.len() + directive.len() + 1);
    let mut replaced = false;

    for line in existing.split_inclusive('\n') {
        if !replaced && line.starts_with(SITEMAP_DIRECTIVE) {
            let ending = line_ending(line);
            out.push_str(&directive);
            out.push_str(ending);
            replaced = true;
        } else {
            out.push_str(line);
        }
    }

    if replaced {
        return (out, RobotsChange::Replaced);
    }

    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&directive);
    out.push('\n');
    (out, RobotsChange::Appended)
}

/// Read-modify-write the robots file at `path`.
pub fn write_robots(path: &Path, sitemap_url: &str) -> Result<RobotsChange> {
    let existing = match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(err) if err.kind() == ErrorKind::NotFound => None,
        Err(err) => {
            return Err(err).with_context(|| format!("Failed to read {}", path.display()));
        }
    };

    let (content, change) = update_robots(existing.as_deref(), sitemap_url);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content)
        .with_context(|| format!("Failed to write robots.txt to {}", path.display()))?;

    let action = match change {
        RobotsChange::Created => "created",
        RobotsChange::Replaced => "updated",
        RobotsChange::Appended => "appended sitemap to",
    };
    log!("robots"; "{action} {}", path.file_name().unwrap_or_default().to_string_lossy());

    Ok(change)
}

// ============================================================================
// Helper Functions
// ============================================================================

fn default_robots(directive: &str) -> String {
    let mut out = String::from("User-agent: *\nAllow: /\n\n");
    for path in DISALLOWED {
        out.push_str(&format!("Disallow: {path}\n"));
    }
    out.push('\n');
    out.push_str(directive);
    out.push('\n');
    out
}

/// The line terminator of `line` (`\r\n`, `\n` or none).
fn line_ending(line: &str) -> &str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    }
}

// ============================================================================
// Tests
// ============================================================================
