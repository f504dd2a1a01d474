//! Embedded landing page served at `/`.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

/// Landing page bytes, compiled into the binary.
pub static LANDING_PAGE: &[u8] = include_bytes!("../../static/index.html");

pub const CONTENT_TYPE: &str = "text/html; charset=utf-8";

pub fn landing_page() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE))],
        LANDING_PAGE,
    )
        .into_response()
}
