//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{ApiKey, ProxyConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Frontend origin allowed by the CORS policy.
pub const ENV_FRONTEND_URL: &str = "FRONTEND_URL";
/// Set by the hosting platform on every deployment, including previews.
pub const ENV_PLATFORM_MARKER: &str = "VERCEL_URL";
/// Upstream API key.
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a TOML file, apply environment overrides, and validate.
pub fn load_config(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ProxyConfig = toml::from_str(&content)?;
    finish(apply_env_overrides(config, env_lookup))
}

/// Defaults plus environment overrides, for running without a config file.
pub fn from_env() -> Result<ProxyConfig, ConfigError> {
    finish(apply_env_overrides(ProxyConfig::default(), env_lookup))
}

fn finish(mut config: ProxyConfig) -> Result<ProxyConfig, ConfigError> {
    // `api_key = ""` in the file means no key.
    config.credential.api_key = config.credential.api_key.filter(|k| !k.is_empty());
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Overlay environment values on top of `config`.
///
/// Empty values are treated as unset so that `GEMINI_API_KEY=` does not
/// count as a configured key.
pub fn apply_env_overrides<F>(mut config: ProxyConfig, lookup: F) -> ProxyConfig
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(url) = get(ENV_FRONTEND_URL) {
        config.cors.frontend_url = Some(url);
    }
    if let Some(marker) = get(ENV_PLATFORM_MARKER) {
        config.cors.platform_marker = Some(marker);
    }
    if let Some(key) = get(ENV_API_KEY) {
        config.credential.api_key = Some(ApiKey::new(key));
    }

    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = ProxyConfig::default();
        config.cors.frontend_url = Some("https://old.example.com".into());

        let config = apply_env_overrides(
            config,
            lookup_from(&[
                (ENV_FRONTEND_URL, "https://app.example.com"),
                (ENV_PLATFORM_MARKER, "app-git-main.vercel.app"),
                (ENV_API_KEY, "k-123"),
            ]),
        );

        assert_eq!(config.cors.frontend_url.as_deref(), Some("https://app.example.com"));
        assert_eq!(config.cors.platform_marker.as_deref(), Some("app-git-main.vercel.app"));
        assert_eq!(config.credential.api_key.unwrap().expose(), "k-123");
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let config = apply_env_overrides(
            ProxyConfig::default(),
            lookup_from(&[(ENV_API_KEY, ""), (ENV_PLATFORM_MARKER, "  ")]),
        );
        assert!(config.credential.api_key.is_none());
        assert!(config.cors.platform_marker.is_none());
    }

    #[test]
    fn test_load_config_reports_parse_and_validation_errors() {
        let dir = std::env::temp_dir();

        let bad_toml = dir.join(format!("genai-proxy-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&bad_toml, "[listener\nbind_address = ").unwrap();
        assert!(matches!(load_config(&bad_toml), Err(ConfigError::Parse(_))));

        let invalid = dir.join(format!("genai-proxy-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&invalid, "[listener]\nroute = \"no-slash\"\n").unwrap();
        match load_config(&invalid) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors, vec![ValidationError::InvalidRoute("no-slash".into())]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        let _ = fs::remove_file(bad_toml);
        let _ = fs::remove_file(invalid);
    }

    #[test]
    fn test_empty_file_key_is_treated_as_unset() {
        let path = std::env::temp_dir().join(format!("genai-proxy-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "[credential]\napi_key = \"\"\n").unwrap();

        let config = load_config(&path).unwrap();
        if std::env::var(ENV_API_KEY).map_or(true, |v| v.trim().is_empty()) {
            assert!(config.credential.api_key.is_none());
        }
        assert!(config.credential.api_key.as_ref().map_or(true, |k| !k.is_empty()));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_load_config_missing_file() {
        let missing = std::env::temp_dir().join("genai-proxy-does-not-exist.toml");
        assert!(matches!(load_config(&missing), Err(ConfigError::Io(_))));
    }
}
