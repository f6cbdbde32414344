//! HTTP response boundary.
//!
//! # Responsibilities
//! - Implement the `HeaderSink` capability for `http::HeaderMap`
//! - Provide an axum middleware running one compiler per request
//! - Expose the request nonce to handlers via a request extension
//!
//! # Design Decisions
//! - The middleware owns the compiler lifecycle; nonce state never leaks
//!   across requests
//! - Sink failures are logged, not retried; the response is still served

pub mod middleware;

pub use middleware::{secure_headers_middleware, CspNonce};
