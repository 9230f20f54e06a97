//! Request handling and transformation.
//!
//! # Responsibilities
//! - Rewrite the inbound URI onto the chosen backend (single-host reverse proxy)
//! - Strip hop-by-hop headers before forwarding
//! - Append the client IP to `x-forwarded-for`
//!
//! # Design Decisions
//! - The inbound `Host` header is forwarded unchanged
//! - Backend base path and request path are joined with exactly one slash
//! - Backend and request query strings are concatenated with '&'

use axum::body::Body;
use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};
use axum::http::{Request, Uri, Version};
use std::net::SocketAddr;
use thiserror::Error;

use crate::load_balancer::Backend;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Headers that describe a single transport hop and must not be forwarded.
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Error type for building the upstream request.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("invalid upstream URI: {0}")]
    Uri(#[from] axum::http::Error),
}

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn remove_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Map an inbound URI onto `backend`.
pub fn rewrite_uri(backend: &Backend, uri: &Uri) -> Result<Uri, axum::http::Error> {
    let path = join_paths(backend.base_url.path(), uri.path());
    let query = match (backend.base_url.query(), uri.query()) {
        (Some(a), Some(b)) if !a.is_empty() => Some(format!("{}&{}", a, b)),
        (Some(a), None) if !a.is_empty() => Some(a.to_string()),
        (_, Some(b)) => Some(b.to_string()),
        _ => None,
    };
    let path_and_query = match query {
        Some(q) => format!("{}?{}", path, q),
        None => path,
    };

    Uri::builder()
        .scheme(backend.base_url.scheme())
        .authority(backend.authority())
        .path_and_query(path_and_query)
        .build()
}

fn join_paths(base: &str, path: &str) -> String {
    match (base.ends_with('/'), path.starts_with('/')) {
        (true, true) => format!("{}{}", base, &path[1..]),
        (false, false) => format!("{}/{}", base, path),
        _ => format!("{}{}", base, path),
    }
}

/// Turn an inbound request into the request sent to `backend`.
///
/// The body is streamed through untouched.
pub fn build_upstream_request(
    request: Request<Body>,
    backend: &Backend,
    peer: SocketAddr,
) -> Result<Request<Body>, ForwardError> {
    let (mut parts, body) = request.into_parts();

    parts.uri = rewrite_uri(backend, &parts.uri)?;
    parts.version = Version::HTTP_11;
    remove_hop_by_hop(&mut parts.headers);
    append_forwarded_for(&mut parts.headers, peer);

    Ok(Request::from_parts(parts, body))
}

fn append_forwarded_for(headers: &mut HeaderMap, peer: SocketAddr) {
    let client_ip = peer.ip().to_string();
    let prior: Vec<&str> = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();

    let value = if prior.is_empty() {
        client_ip
    } else {
        format!("{}, {}", prior.join(", "), client_ip)
    };

    if let Ok(v) = HeaderValue::from_str(&value) {
        headers.insert(X_FORWARDED_FOR, v);
    }
}
