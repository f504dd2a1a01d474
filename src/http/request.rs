//! Request handling and transformation.
//!
//! # Responsibilities
//! - Recover the absolute target URL embedded in the request path
//! - Copy inbound headers onto the outbound request
//! - Build the outbound request with the inbound method and streaming body
//!
//! # Data Flow
//! ```text
//! /https://example.com/a/b?x=1
//!     → strip leading '/' → "https://example.com/a/b"
//!     → normalize "https:" + any '/' run → "https://"
//!     → append raw query → "https://example.com/a/b?x=1"
//! ```

use std::borrow::Cow;
use std::fmt;

use axum::{
    body::{Body, HttpBody},
    http::{header, HeaderMap, HeaderName, HeaderValue, Request},
};

use percent_encoding::percent_decode_str;

use crate::http::error::{RelayError, RelayResult};

/// Schemes recognised directly after the leading slashes.
const SCHEMES: [&str; 2] = ["https", "http"];

/// Headers tied to the inbound connection rather than the message.
const CONNECTION_HEADERS: [HeaderName; 3] = [
    header::HOST,
    header::CONNECTION,
    header::TRANSFER_ENCODING,
];

/// An absolute `http`/`https` URL extracted from an inbound path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl(String);

impl TargetUrl {
    /// Extract the target from a raw request path and optional raw query.
    ///
    /// Any number of leading slashes is accepted, and any number of slashes
    /// after the scheme collapses to `//`. A candidate that does not start
    /// with `http` is rejected with the candidate in the error message.
    ///
    /// The path stays percent-encoded unless the scheme itself or the
    /// slashes right after it are encoded (`http%3A...`, `https:%2F...`);
    /// only then is the whole path decoded before matching.
    pub fn from_path(path: &str, query: Option<&str>) -> RelayResult<Self> {
        let path: Cow<'_, str> = if has_encoded_scheme(path.trim_start_matches('/')) {
            percent_decode_str(path).decode_utf8_lossy()
        } else {
            Cow::Borrowed(path)
        };

        let mut candidate = match split_scheme(path.trim_start_matches('/')) {
            Some((scheme, rest)) => {
                format!("{}://{}", scheme, rest.trim_start_matches('/'))
            }
            None => path.to_string(),
        };

        if let Some(query) = query.filter(|q| !q.is_empty()) {
            candidate.push('?');
            candidate.push_str(query);
        }

        if !candidate.starts_with("http") {
            return Err(RelayError::InvalidTarget(candidate));
        }

        Ok(Self(candidate))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into a URL the outbound client accepts.
    pub fn to_url(&self) -> RelayResult<reqwest::Url> {
        Ok(reqwest::Url::parse(&self.0)?)
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split `scheme:rest` when the scheme is one we relay to.
fn split_scheme(s: &str) -> Option<(&'static str, &str)> {
    SCHEMES.iter().find_map(|scheme| {
        s.strip_prefix(scheme)
            .and_then(|rest| rest.strip_prefix(':'))
            .map(|rest| (*scheme, rest))
    })
}

/// Whether `s` opens with a scheme whose `:` or following `/` is encoded.
fn has_encoded_scheme(s: &str) -> bool {
    SCHEMES.iter().any(|scheme| match s.strip_prefix(scheme) {
        Some(rest) => {
            starts_with_escape(rest, "%3A")
                || rest
                    .strip_prefix(':')
                    .is_some_and(|rest| starts_with_escape(rest, "%2F"))
        }
        None => false,
    })
}

fn starts_with_escape(s: &str, escape: &str) -> bool {
    s.get(..escape.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(escape))
}

/// Copy inbound headers for the outbound request.
///
/// Every value of every header is appended in order, so multi-valued
/// headers survive intact. With `force_gzip` set, a caller that accepts
/// gzip gets exactly `Accept-Encoding: gzip` toward the upstream.
pub fn forward_headers(inbound: &HeaderMap, force_gzip: bool) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(inbound.len());
    for (name, value) in inbound {
        if CONNECTION_HEADERS.contains(name) {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }

    if force_gzip && accepts_gzip(inbound) {
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
    }

    headers
}

fn accepts_gzip(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains("gzip"))
}

/// Build the outbound request for `target` from the inbound request.
///
/// The body is handed over as a stream; nothing is buffered here.
pub fn build_outbound(
    target: &TargetUrl,
    request: Request<Body>,
    force_gzip: bool,
) -> RelayResult<reqwest::Request> {
    let url = target.to_url()?;
    let (parts, body) = request.into_parts();

    let mut outbound = reqwest::Request::new(parts.method, url);
    *outbound.headers_mut() = forward_headers(&parts.headers, force_gzip);

    if body.size_hint().exact() != Some(0) {
        *outbound.body_mut() = Some(reqwest::Body::wrap_stream(body.into_data_stream()));
    }

    Ok(outbound)
}
