//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, body limit)
//!     → request.rs (typed IncomingRequest, lazy JSON body)
//!     → handler.rs (CORS, method gate, credential, forward)
//!     → response.rs (error mapping to {"error": ...})
//!     → Send to client
//! ```

pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use request::{IncomingRequest, MakeRequestUuidV4, X_REQUEST_ID};
pub use response::ProxyError;
pub use server::{AppState, HttpServer};
