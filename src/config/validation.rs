//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and URLs before they reach the server
//! - Check allow-list entries are well-formed origins
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - A missing API key is not an error; it is reported per request

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid socket address for {field}: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("invalid URL for {field}: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("listener.route must start with '/': {0}")]
    InvalidRoute(String),

    #[error("cors.preview_suffix must start with '.': {0}")]
    InvalidPreviewSuffix(String),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if !config.listener.route.starts_with('/') {
        errors.push(ValidationError::InvalidRoute(config.listener.route.clone()));
    }

    if !is_http_url(&config.upstream.endpoint) {
        errors.push(ValidationError::InvalidUrl {
            field: "upstream.endpoint",
            value: config.upstream.endpoint.clone(),
        });
    }

    if config.upstream.key_param.is_empty() {
        errors.push(ValidationError::Empty("upstream.key_param"));
    }

    if let Some(frontend) = &config.cors.frontend_url {
        if !is_http_url(frontend) {
            errors.push(ValidationError::InvalidUrl {
                field: "cors.frontend_url",
                value: frontend.clone(),
            });
        }
    }

    for origin in &config.cors.dev_origins {
        if !is_http_url(origin) {
            errors.push(ValidationError::InvalidUrl {
                field: "cors.dev_origins",
                value: origin.clone(),
            });
        }
    }

    let suffix = &config.cors.preview_suffix;
    if !suffix.is_empty() && !suffix.starts_with('.') {
        errors.push(ValidationError::InvalidPreviewSuffix(suffix.clone()));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::Zero("security.max_body_size"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(value: &str) -> bool {
    Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.has_host())
        .unwrap_or(false)
}
