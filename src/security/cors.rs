//! Origin allow-list and CORS response headers.
//!
//! The allow-list is rebuilt from the current [`CorsConfig`] on every
//! request, so a reloaded config applies to the next request.
//!
//! Allowed origins:
//! - `cors.frontend_url` (exact match)
//! - `cors.dev_origins` (exact match)
//! - any origin ending in `cors.preview_suffix`, but only while
//!   `cors.platform_marker` is set
//!
//! A missing `Origin` and a non-matching one are treated the same: no
//! `Access-Control-Allow-Origin` header. The request itself is still served.

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, VARY,
};
use axum::http::{HeaderMap, HeaderValue};

use crate::config::CorsConfig;

pub const ALLOWED_METHODS: &str = "POST, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type";

/// Per-request view of the CORS configuration.
pub struct OriginPolicy<'a> {
    config: &'a CorsConfig,
}

impl<'a> OriginPolicy<'a> {
    pub fn new(config: &'a CorsConfig) -> Self {
        Self { config }
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        if self.config.frontend_url.as_deref() == Some(origin) {
            return true;
        }
        if self.config.dev_origins.iter().any(|o| o == origin) {
            return true;
        }
        self.preview_enabled() && origin.ends_with(self.config.preview_suffix.as_str())
    }

    fn preview_enabled(&self) -> bool {
        let marker_set = self
            .config
            .platform_marker
            .as_deref()
            .is_some_and(|m| !m.is_empty());
        marker_set && !self.config.preview_suffix.is_empty()
    }

    /// The `Origin` value to echo back, if it is allowed.
    pub fn allowed_origin<'o>(&self, origin: Option<&'o HeaderValue>) -> Option<&'o HeaderValue> {
        origin.filter(|v| v.to_str().is_ok_and(|s| self.is_allowed(s)))
    }

    /// Write the CORS headers every response carries.
    pub fn apply(&self, origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
        if let Some(origin) = self.allowed_origin(origin) {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        }
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        headers.insert(VARY, HeaderValue::from_static("Origin"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CorsConfig {
        CorsConfig {
            frontend_url: Some("https://app.example.com".into()),
            ..CorsConfig::default()
        }
    }

    #[test]
    fn test_exact_origins() {
        let config = config();
        let policy = OriginPolicy::new(&config);
        assert!(policy.is_allowed("https://app.example.com"));
        assert!(policy.is_allowed("http://localhost:3000"));
        assert!(policy.is_allowed("http://127.0.0.1:5500"));

        assert!(!policy.is_allowed("https://app.example.com/"));
        assert!(!policy.is_allowed("http://localhost:3001"));
        assert!(!policy.is_allowed("https://evil.example.com"));
    }

    #[test]
    fn test_preview_origins_need_platform_marker() {
        let mut config = config();
        let preview = "https://app-git-feature-team.vercel.app";

        assert!(!OriginPolicy::new(&config).is_allowed(preview));

        config.platform_marker = Some("app-abc123.vercel.app".into());
        let policy = OriginPolicy::new(&config);
        assert!(policy.is_allowed(preview));
        assert!(!policy.is_allowed("https://vercel.app.evil.com"));
    }

    #[test]
    fn test_empty_suffix_never_matches_everything() {
        let mut config = config();
        config.platform_marker = Some("marker".into());
        config.preview_suffix = String::new();
        assert!(!OriginPolicy::new(&config).is_allowed("https://anything.example"));
    }

    #[test]
    fn test_apply_echoes_allowed_origin() {
        let config = config();
        let mut headers = HeaderMap::new();
        let origin = HeaderValue::from_static("http://localhost:3000");

        OriginPolicy::new(&config).apply(Some(&origin), &mut headers);

        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:3000");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
        assert_eq!(headers[VARY], "Origin");
    }

    #[test]
    fn test_apply_omits_origin_when_missing_or_disallowed() {
        let config = config();
        let policy = OriginPolicy::new(&config);

        let mut headers = HeaderMap::new();
        policy.apply(None, &mut headers);
        assert!(headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_eq!(headers[VARY], "Origin");

        let mut headers = HeaderMap::new();
        let origin = HeaderValue::from_static("https://evil.example.com");
        policy.apply(Some(&origin), &mut headers);
        assert!(headers.get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
    }
}
