//! Response shapes and error mapping.
//!
//! # Responsibilities
//! - Map every handler failure to exactly one `{"error": string}` response
//! - Keep internal detail (missing key, transport errors) out of bodies
//!
//! # Design Decisions
//! - Upstream rejections keep the upstream's status code
//! - Transport and malformed-response failures are a generic 500

use axum::http::header::ALLOW;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use crate::security::cors::ALLOWED_METHODS;
use crate::upstream::UpstreamError;

pub const MSG_METHOD_NOT_ALLOWED: &str = "Method Not Allowed";
pub const MSG_MISSING_API_KEY: &str = "API key is not configured on the server.";
pub const MSG_INVALID_JSON: &str = "Invalid JSON in request body.";
pub const MSG_INTERNAL: &str = "An internal server error occurred.";

/// Errors the proxy handler can produce.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("API key is not configured on the server")]
    MissingApiKey,

    /// The body could not be read (e.g. it exceeded the size limit).
    #[error("failed to read request body: {message}")]
    Body { status: StatusCode, message: String },

    #[error("invalid JSON in request body: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The upstream answered with a non-2xx status.
    #[error("upstream rejected request ({status}): {message}")]
    Upstream { status: StatusCode, message: String },

    #[error(transparent)]
    Transport(#[from] UpstreamError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::MissingApiKey | Self::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Body { status, .. } | Self::Upstream { status, .. } => *status,
            Self::InvalidJson(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// The message placed in the response body.
    pub fn public_message(&self) -> &str {
        match self {
            Self::MethodNotAllowed => MSG_METHOD_NOT_ALLOWED,
            Self::MissingApiKey => MSG_MISSING_API_KEY,
            Self::Body { message, .. } | Self::Upstream { message, .. } => message.as_str(),
            Self::InvalidJson(_) => MSG_INVALID_JSON,
            Self::Transport(_) => MSG_INTERNAL,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let mut response = json_error(self.status(), self.public_message());
        if matches!(self, Self::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static(ALLOWED_METHODS));
        }
        response
    }
}

/// `{"error": message}` with the given status.
pub fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
