//! Relay error taxonomy.
//!
//! # Design Decisions
//! - Malformed targets are the caller's fault (400) and are not logged as faults
//! - Anything that goes wrong building or executing the outbound call is a 500
//! - The response body carries the failure description, the log carries the same
//!   text plus the variant for triage

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors that end a relay before an upstream response is available.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The path did not resolve to an `http`/`https` URL.
    #[error("invalid url: {0}")]
    InvalidTarget(String),

    /// The extracted target looked like a URL but could not be parsed.
    #[error("{0}")]
    Url(#[from] url::ParseError),

    /// DNS, connect, TLS or protocol failure talking to the upstream.
    #[error("{}", describe(.0))]
    Upstream(#[from] reqwest::Error),
}

/// Result type for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

impl RelayError {
    /// Status code the caller receives for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            RelayError::Url(_) | RelayError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(error = ?self, "Internal server error: {}", message);
        } else {
            tracing::debug!(error = %message, "Rejected relay request");
        }

        (status, message).into_response()
    }
}

/// Flatten an error and its sources into one line.
///
/// `reqwest` keeps the interesting part (connection refused, dns failure)
/// in the source chain, not in its own `Display`.
fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
