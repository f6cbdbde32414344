//! Security header policy compiler.
//!
//! Derives HTTP response security headers (Content-Security-Policy,
//! Strict-Transport-Security, X-Frame-Options, Feature-Policy /
//! Permissions-Policy, Expect-CT, Clear-Site-Data, …) from a declarative
//! policy and applies them to a response.
//!
//! # Architecture Overview
//!
//! ```text
//! policy file (TOML/JSON) ──▶ config ──▶ HeaderPolicy (typed, immutable)
//!                                             │
//!                                             ▼
//!                                  SecureHeaders (one per request)
//!                             resolve × compose × nonce provider
//!                                             │
//!                                             ▼
//!                               HeaderSet (ordered name → value)
//!                                             │
//!                                             ▼
//!                            HeaderSink (http::HeaderMap, middleware)
//! ```
//!
//! # Usage
//!
//! ```
//! use secure_headers::{HeaderPolicy, SecureHeaders};
//!
//! let policy: HeaderPolicy = toml::from_str(
//!     r#"
//!     [csp]
//!     enable = true
//!
//!     [csp.default-src]
//!     self = true
//!     "#,
//! )
//! .unwrap();
//!
//! let headers = SecureHeaders::new(policy).headers();
//! assert_eq!(
//!     headers.get("Content-Security-Policy"),
//!     Some("default-src 'self'")
//! );
//! ```

pub mod compiler;
pub mod config;
pub mod http;

pub use compiler::{HeaderSet, HeaderSink, SecureHeaders};
pub use config::{load_policy, HeaderPolicy, PolicyError, Setting};
pub use http::{secure_headers_middleware, CspNonce};
