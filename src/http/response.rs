//! Response handling and transformation.
//!
//! # Responsibilities
//! - Hand backend responses back to the client as a stream
//! - Strip hop-by-hop headers from backend responses
//! - Produce the short plain-text rejections (503, 502)

use axum::body::Body;
use axum::http::{header, HeaderValue, Response, StatusCode};
use axum::response::IntoResponse;
use hyper::body::Incoming;

use crate::http::request::remove_hop_by_hop;

pub const NO_HEALTHY_BACKENDS: &str = "No healthy backends available";
pub const BAD_GATEWAY: &str = "Bad Gateway";

/// Convert a backend response into the client response without buffering the body.
pub fn from_upstream(response: Response<Incoming>) -> Response<Body> {
    let (mut parts, body) = response.into_parts();
    remove_hop_by_hop(&mut parts.headers);
    Response::from_parts(parts, Body::new(body))
}

/// 503 for when every backend is down.
pub fn service_unavailable() -> Response<Body> {
    plain_text(StatusCode::SERVICE_UNAVAILABLE, NO_HEALTHY_BACKENDS)
}

/// 502 for when the chosen backend failed mid-exchange.
pub fn bad_gateway() -> Response<Body> {
    plain_text(StatusCode::BAD_GATEWAY, BAD_GATEWAY)
}

fn plain_text(status: StatusCode, body: &'static str) -> Response<Body> {
    let mut response = (status, body).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
}
