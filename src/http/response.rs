//! Response handling and transformation.
//!
//! # Responsibilities
//! - Copy upstream status and headers onto the client response
//! - Stream the upstream body through without buffering or transcoding
//!
//! # Design Decisions
//! - The upstream body is owned by the client response body; dropping it on
//!   any path (completion, client disconnect, error) releases the upstream
//!   connection
//! - Framing headers are left to the server side of this connection

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName},
    response::Response,
};
use futures_util::TryStreamExt;

/// Upstream headers describing the upstream connection's framing.
const FRAMING_HEADERS: [HeaderName; 2] = [header::CONNECTION, header::TRANSFER_ENCODING];

/// Turn an upstream response into the client response.
pub fn relay_response(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let headers = relay_headers(upstream.headers());

    let url = upstream.url().clone();
    let stream = upstream.bytes_stream().inspect_err(move |e| {
        tracing::warn!(url = %url, error = %e, "Upstream body stream failed");
    });

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Copy every upstream header value, keeping multi-valued headers whole.
///
/// Upstream CORS headers are copied here but replaced afterwards by the
/// relay's own values in `cors::apply_cors_headers`, so a caller never
/// sees two `Access-Control-Allow-Origin` values.
pub fn relay_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(upstream.len());
    for (name, value) in upstream {
        if FRAMING_HEADERS.contains(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}
