//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → cors.rs (origin allow-list, CORS response headers)
//!     → [method gate and credential check in http::handler]
//!     → Forward upstream
//! ```
//!
//! Body size is capped by `DefaultBodyLimit` in the router.

pub mod cors;

pub use cors::OriginPolicy;
