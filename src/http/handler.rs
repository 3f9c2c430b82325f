//! The proxy handler.
//!
//! ```text
//! request
//!     → CORS headers computed from the current config snapshot
//!     → OPTIONS?            200, empty body
//!     → not POST?           405 {"error":"Method Not Allowed"} + Allow
//!     → no API key?         500 {"error":"API key is not configured on the server."}
//!     → body not JSON?      400 {"error":"Invalid JSON in request body."}
//!     → forward upstream
//!         2xx               200, upstream JSON body unchanged
//!         non-2xx           upstream status, {"error": upstream message}
//!         transport error   500 {"error":"An internal server error occurred."}
//! ```
//!
//! Every branch returns exactly one response and every response carries the
//! CORS headers.

use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::config::ProxyConfig;
use crate::http::request::IncomingRequest;
use crate::http::response::ProxyError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::cors::OriginPolicy;
use crate::upstream::UpstreamReply;

pub async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    // One snapshot per invocation; a reload mid-request is not observed.
    let config = state.config.load_full();

    let incoming = IncomingRequest::from(request);
    let method = incoming.method().clone();
    let origin = incoming.origin().cloned();
    let request_id = incoming.request_id().to_string();

    let mut response = match handle(&state, &config, incoming, &request_id).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };

    OriginPolicy::new(&config.cors).apply(origin.as_ref(), response.headers_mut());

    let status = response.status();
    tracing::debug!(
        request_id = %request_id,
        method = %method,
        status = status.as_u16(),
        origin = ?origin,
        "Request handled"
    );
    metrics::record_request(method.as_str(), status.as_u16(), start_time);

    response
}

async fn handle(
    state: &AppState,
    config: &ProxyConfig,
    incoming: IncomingRequest,
    request_id: &str,
) -> Result<Response, ProxyError> {
    if *incoming.method() == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }

    if *incoming.method() != Method::POST {
        return Err(ProxyError::MethodNotAllowed);
    }

    let key = match config.credential.api_key.as_ref().filter(|k| !k.is_empty()) {
        Some(key) => key,
        None => {
            tracing::error!(request_id = %request_id, "API key is not configured on the server");
            return Err(ProxyError::MissingApiKey);
        }
    };

    let body = incoming.json_body().await.inspect_err(|e| {
        tracing::warn!(request_id = %request_id, error = %e, "Rejected request body");
    })?;

    match state.upstream.forward(&config.upstream, key, &body).await {
        Ok(UpstreamReply::Success(bytes)) => Ok(json_passthrough(bytes)),
        Ok(UpstreamReply::Rejected { status, message }) => {
            tracing::warn!(
                request_id = %request_id,
                status = %status,
                upstream_error = %message,
                "Upstream rejected request"
            );
            Err(ProxyError::Upstream { status, message })
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Server-side error while forwarding");
            Err(ProxyError::Transport(e))
        }
    }
}

/// 200 with the upstream's bytes as the body.
fn json_passthrough(bytes: Bytes) -> Response {
    (
        StatusCode::OK,
        [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        bytes,
    )
        .into_response()
}
