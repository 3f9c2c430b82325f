//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default upstream: the image-capable Gemini model.
pub const DEFAULT_UPSTREAM_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash-image-preview:generateContent";

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, route).
    pub listener: ListenerConfig,

    /// Origin allow-list settings.
    pub cors: CorsConfig,

    /// Upstream API settings.
    pub upstream: UpstreamConfig,

    /// Server-held credential attached to forwarded calls.
    pub credential: CredentialConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Path the proxy handler is mounted on.
    pub route: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            route: "/api/generate-image".to_string(),
        }
    }
}

/// Origin allow-list configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Production frontend origin (e.g., "https://app.example.com").
    pub frontend_url: Option<String>,

    /// Fixed local development origins.
    pub dev_origins: Vec<String>,

    /// Origins ending with this suffix are allowed when `platform_marker` is set.
    pub preview_suffix: String,

    /// Hostname of the current deployment, present only on the hosting platform.
    pub platform_marker: Option<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            frontend_url: None,
            dev_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:5500".to_string(),
            ],
            preview_suffix: ".vercel.app".to_string(),
            platform_marker: None,
        }
    }
}

/// Upstream API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Endpoint every accepted request is POSTed to.
    pub endpoint: String,

    /// Query parameter carrying the credential.
    pub key_param: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_UPSTREAM_ENDPOINT.to_string(),
            key_param: "key".to_string(),
        }
    }
}

/// Credential configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialConfig {
    /// Upstream API key. Absence is reported per request, not at startup.
    pub api_key: Option<ApiKey>,
}

/// Upstream API key.
///
/// `Debug` and `Display` never print the value; use [`ApiKey::expose`] at the
/// single place the key is attached to an outbound call.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([redacted])")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Request hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 10 * 1024 * 1024, // image payloads are base64 inline data
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_is_redacted() {
        let key = ApiKey::new("super-secret");
        assert_eq!(format!("{:?}", key), "ApiKey([redacted])");
        assert_eq!(key.to_string(), "[redacted]");

        let config = CredentialConfig { api_key: Some(key) };
        assert!(!format!("{:?}", config).contains("super-secret"));
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: ProxyConfig = toml::from_str("[credential]\napi_key = \"abc\"\n").unwrap();
        assert_eq!(config.listener.route, "/api/generate-image");
        assert_eq!(config.upstream.key_param, "key");
        assert_eq!(config.cors.dev_origins.len(), 2);
        assert_eq!(config.credential.api_key.unwrap().expose(), "abc");
    }

    #[test]
    fn test_example_config_parses() {
        let config: ProxyConfig =
            toml::from_str(include_str!("../../genai-proxy.example.toml")).unwrap();
        assert_eq!(config.cors.frontend_url.as_deref(), Some("https://app.example.com"));
        assert_eq!(config.upstream.endpoint, DEFAULT_UPSTREAM_ENDPOINT);
        assert!(config.credential.api_key.is_none());
        assert!(crate::config::validation::validate_config(&config).is_ok());
    }
}
