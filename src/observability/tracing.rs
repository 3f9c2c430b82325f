//! Request spans.
//!
//! Each request gets one span carrying its method, path and request ID so
//! that handler and upstream log lines can be correlated. The query string
//! is left out of the span.

use axum::body::Body;
use axum::http::Request;
use tracing::Span;

use crate::http::request::X_REQUEST_ID;

/// `make_span_with` callback for `TraceLayer`.
pub fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}
