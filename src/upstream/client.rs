//! Upstream client for the generative-content API.

use axum::body::Bytes;
use axum::http::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::config::{ApiKey, UpstreamConfig};

/// Used when a rejection carries no `error.message`.
pub const UPSTREAM_FALLBACK_MESSAGE: &str = "An error occurred with the upstream API.";

/// Outcome of a completed upstream exchange.
#[derive(Debug)]
pub enum UpstreamReply {
    /// 2xx response; the exact JSON bytes the upstream sent.
    Success(Bytes),
    /// Non-2xx response with the upstream's status and error message.
    Rejected { status: StatusCode, message: String },
}

/// The exchange did not complete with a JSON response.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Connect, send, or body read failed. The URL (which carries the key)
    /// is stripped before the error is stored.
    #[error("upstream transport error: {0}")]
    Transport(reqwest::Error),

    #[error("upstream returned non-JSON body (status {status}): {source}")]
    MalformedBody {
        status: StatusCode,
        #[source]
        source: serde_json::Error,
    },
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        UpstreamError::Transport(e.without_url())
    }
}

/// Thin wrapper over a pooled `reqwest::Client`.
#[derive(Clone, Default)]
pub struct UpstreamClient {
    http_client: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    /// POST `body` to the configured endpoint with the key as a query parameter.
    ///
    /// Single attempt: no retries and no timeout.
    pub async fn forward(
        &self,
        upstream: &UpstreamConfig,
        key: &ApiKey,
        body: &Value,
    ) -> Result<UpstreamReply, UpstreamError> {
        let response = self
            .http_client
            .post(&upstream.endpoint)
            .query(&[(upstream.key_param.as_str(), key.expose())])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let data: Value = serde_json::from_slice(&bytes)
            .map_err(|source| UpstreamError::MalformedBody { status, source })?;

        if status.is_success() {
            return Ok(UpstreamReply::Success(bytes));
        }

        Ok(UpstreamReply::Rejected {
            status,
            message: rejection_message(&data),
        })
    }
}

/// `error.message` from an upstream error payload, or the generic fallback.
pub fn rejection_message(data: &Value) -> String {
    data.get("error")
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .unwrap_or(UPSTREAM_FALLBACK_MESSAGE)
        .to_string()
}
