//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse, overlay FRONTEND_URL / VERCEL_URL / GEMINI_API_KEY)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via ArcSwap with the request handler
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of Arc<ProxyConfig>
//!     → the next request observes the new config
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - The handler takes one snapshot per request, so the credential is read
//!   once per invocation

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::ConfigError;
pub use schema::{
    ApiKey, CorsConfig, CredentialConfig, ListenerConfig, ObservabilityConfig, ProxyConfig,
    SecurityConfig, UpstreamConfig,
};
