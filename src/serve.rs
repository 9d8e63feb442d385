//! On-demand sitemap endpoint.
//!
//! A small HTTP server, built on `tiny_http`, that renders the sitemap from
//! fresh backend data on every authorized request:
//!
//! - `OPTIONS` → `204` with permissive CORS headers
//! - no `Authorization: Bearer <token>` → `401` JSON, backend untouched
//! - success → `200` XML, cacheable for one hour
//! - pipeline failure → `500` JSON
//!
//! The token is only checked for presence; validating it is left to whatever
//! sits in front of this endpoint.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐      ┌──────────────┐      ┌──────────────────┐
//! │   Main Thread   │ ───► │   respond()  │ ───► │ Generator (fetch │
//! │  (HTTP Server)  │      │ (auth, CORS) │      │   + render)      │
//! └─────────────────┘      └──────────────┘      └──────────────────┘
//! ```

use crate::{config::SiteConfig, generate::Generator, log, source::ContentSource};
use anyhow::{Context, Result};
use serde_json::json;
use std::{io::Cursor, net::SocketAddr, sync::Arc};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

// ============================================================================
// Constants
// ============================================================================

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    (
        "Access-Control-Allow-Headers",
        "authorization, x-client-info, apikey, content-type",
    ),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
];

const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";
const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const CACHE_CONTROL: &str = "public, max-age=3600";

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the sitemap endpoint.
///
/// Binds to the configured interface and port (with auto-retry on port
/// conflict) and serves requests until Ctrl+C is received.
pub fn serve_sitemap(config: &SiteConfig, source: &dyn ContentSource) -> Result<()> {
    let interface: std::net::IpAddr = config
        .serve
        .interface
        .parse()
        .with_context(|| format!("invalid [serve.interface] `{}`", config.serve.interface))?;

    let (server, addr) = try_bind_port(interface, config.serve.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    // Set up Ctrl+C handler for graceful shutdown
    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{}", addr);

    let generator = Generator::new(config, source);
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &generator) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: std::net::IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

// ============================================================================
// Request Handling
// ============================================================================

/// Handle a single HTTP request.
fn handle_request(request: Request, generator: &Generator) -> Result<()> {
    let authorization = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Authorization"))
        .map(|h| h.value.as_str().to_owned());

    let reply = respond(request.method(), authorization.as_deref(), generator);
    if reply.status >= 400 {
        log!("serve"; "{} {} -> {}", request.method(), request.url(), reply.status);
    }

    request.respond(reply.into_response())?;
    Ok(())
}

/// Transport-independent response.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub cacheable: bool,
    pub body: String,
}

impl Reply {
    fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            cacheable: false,
            body: String::new(),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: Some(JSON_CONTENT_TYPE),
            cacheable: false,
            body: json!({ "error": message }).to_string(),
        }
    }

    fn xml(body: String) -> Self {
        Self {
            status: 200,
            content_type: Some(XML_CONTENT_TYPE),
            cacheable: true,
            body,
        }
    }

    /// Every header sent with this reply, CORS included.
    pub fn headers(&self) -> Vec<(&'static str, &'static str)> {
        let mut headers = CORS_HEADERS.to_vec();
        if let Some(content_type) = self.content_type {
            headers.push(("Content-Type", content_type));
        }
        if self.cacheable {
            headers.push(("Cache-Control", CACHE_CONTROL));
        }
        headers
    }

    fn into_response(self) -> Response<Cursor<Vec<u8>>> {
        let headers = self
            .headers()
            .into_iter()
            .filter_map(|(name, value)| Header::from_bytes(name, value).ok())
            .collect();
        let data = self.body.into_bytes();
        let len = data.len();

        Response::new(StatusCode(self.status), headers, Cursor::new(data), Some(len), None)
    }
}

/// Decide the reply for a request.
///
/// Authorization is checked before any backend query is issued.
pub fn respond(method: &Method, authorization: Option<&str>, generator: &Generator) -> Reply {
    if *method == Method::Options {
        return Reply::empty(204);
    }

    if bearer_token(authorization).is_none() {
        return Reply::error(401, "Missing or malformed authorization header");
    }

    match generator.render() {
        Ok(xml) => Reply::xml(xml),
        Err(err) => {
            log!("error"; "{err:#}");
            Reply::error(500, &format!("{err:#}"))
        }
    }
}

/// Token of a `Bearer <token>` header value, if well-formed.
fn bearer_token(authorization: Option<&str>) -> Option<&str> {
    authorization?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// ============================================================================
// Tests
// ============================================================================
