//! PostgREST-backed content source.
//!
//! Each collection is one `GET` against `{backend}/rest/v1/{table}` with a
//! column projection and a single equality filter:
//!
//! ```text
//! GET /rest/v1/blog_posts?select=slug%2Cupdated_at&status=eq.published
//! apikey: <key>
//! Authorization: Bearer <key>
//! ```

use super::{ContentRecord, ContentSource, ContentType, FetchError};
use crate::config::SiteConfig;
use anyhow::{Context, Result};
use reqwest::{
    StatusCode,
    blocking::Client,
    header::{ACCEPT, HeaderMap, HeaderValue},
};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Content source talking to the hosted REST backend.
pub struct RestSource {
    client: Client,
    base_url: String,
}

/// Error body returned by the backend on failed queries.
#[derive(Deserialize)]
struct BackendErrorBody {
    message: String,
}

impl RestSource {
    /// Create a source for `base_url` authenticated with `key`.
    pub fn new(base_url: &str, key: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key_value = HeaderValue::from_str(key).context("backend key is not a valid header")?;
        let bearer = HeaderValue::from_str(&format!("Bearer {key}"))
            .context("backend key is not a valid header")?;
        headers.insert("apikey", key_value);
        headers.insert(reqwest::header::AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("shopmap/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .context("Failed to build backend http client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a source from validated `[backend]` settings.
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        let backend = &config.backend;
        let url = backend.url.as_deref().context("[backend.url] is not set")?;
        let key = backend.key.as_deref().context("[backend.key] is not set")?;
        Self::new(url, key, Duration::from_secs(backend.timeout_secs))
    }

    /// Query URL for one collection.
    fn endpoint(&self, kind: ContentType) -> String {
        let (column, value) = kind.visibility_filter();
        format!(
            "{}/rest/v1/{}?select={}&{}=eq.{}",
            self.base_url,
            kind.table(),
            urlencoding::encode(&kind.columns()),
            column,
            urlencoding::encode(value),
        )
    }
}

impl ContentSource for RestSource {
    fn fetch(&self, kind: ContentType) -> Result<Vec<ContentRecord>, FetchError> {
        let transport = |source: reqwest::Error| FetchError::Transport { kind, source };

        let response = self
            .client
            .get(self.endpoint(kind))
            .send()
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.text() {
                Ok(body) => backend_message(status, &body),
                Err(err) => format!("HTTP {status} (failed to read body: {err})"),
            };
            return Err(FetchError::Backend { kind, message });
        }

        let rows: Vec<Value> = response.json().map_err(transport)?;
        rows.iter().map(|row| parse_row(kind, row)).collect()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Extract the backend's `message`, falling back to the status line.
fn backend_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<BackendErrorBody>(body) {
        Ok(err) => err.message,
        Err(_) if body.trim().is_empty() => format!("HTTP {status}"),
        Err(_) => format!("HTTP {status}: {}", body.trim()),
    }
}

/// Reduce one JSON row to a [`ContentRecord`].
///
/// Numeric ids are accepted and rendered in decimal.
fn parse_row(kind: ContentType, row: &Value) -> Result<ContentRecord, FetchError> {
    let column = kind.key_column();
    let key = match row.get(column) {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(FetchError::MalformedRow { kind, column }),
    };

    let updated_at = match row.get("updated_at") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(FetchError::MalformedRow {
                kind,
                column: "updated_at",
            });
        }
    };

    Ok(ContentRecord { key, updated_at })
}

// ============================================================================
// Tests
// ============================================================================
