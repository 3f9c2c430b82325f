//! Inbound request handling.
//!
//! # Responsibilities
//! - Generate a request ID (UUID v4) for every request without one
//! - Wrap the raw axum request in a typed [`IncomingRequest`]
//! - Read and parse the JSON body only once the request has passed the
//!   method and credential gates

use axum::body::{Body, Bytes};
use axum::extract::FromRequest;
use axum::http::header::ORIGIN;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Request};
use serde_json::Value;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::http::response::ProxyError;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Request ID generator for `SetRequestIdLayer`.
#[derive(Clone, Copy, Debug, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// An inbound request as seen by the proxy handler.
///
/// Head fields are available immediately; the body stays unread until
/// [`IncomingRequest::json_body`] is called.
pub struct IncomingRequest {
    parts: Parts,
    body: Body,
}

impl From<Request<Body>> for IncomingRequest {
    fn from(request: Request<Body>) -> Self {
        let (parts, body) = request.into_parts();
        Self { parts, body }
    }
}

impl IncomingRequest {
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    pub fn origin(&self) -> Option<&HeaderValue> {
        self.parts.headers.get(ORIGIN)
    }

    pub fn request_id(&self) -> &str {
        self.parts
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }

    /// Read the body (subject to `DefaultBodyLimit`) and parse it as JSON.
    pub async fn json_body(self) -> Result<Value, ProxyError> {
        let request = Request::from_parts(self.parts, self.body);
        let bytes = Bytes::from_request(request, &())
            .await
            .map_err(|rejection| ProxyError::Body {
                status: rejection.status(),
                message: rejection.body_text(),
            })?;

        serde_json::from_slice(&bytes).map_err(ProxyError::InvalidJson)
    }
}
