//! Outbound side of the proxy.
//!
//! One POST per accepted request to the configured endpoint, with the
//! server-held key attached as a query parameter. The key never leaves this
//! module except inside the request URL.

pub mod client;

pub use client::{UpstreamClient, UpstreamError, UpstreamReply, UPSTREAM_FALLBACK_MESSAGE};
