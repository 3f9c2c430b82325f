//! Secure pass-through proxy for a generative-content API.
//!
//! Browsers call this service instead of the upstream API, so the API key
//! stays on the server. One request in, at most one upstream call out.
//!
//! ```text
//!     Browser ──POST /api/generate-image──▶ ┌──────────────────────────────┐
//!                                            │ http::server (axum + layers) │
//!                                            │   → http::handler            │
//!                                            │       security::cors         │
//!                                            │       method / key gates     │
//!                                            │   → upstream::client ────────┼──▶ Upstream API
//!     Browser ◀──── JSON / {"error": ..} ─── │                              │    (?key=...)
//!                                            └──────────────────────────────┘
//! ```

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod upstream;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
