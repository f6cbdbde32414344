//! Security headers middleware.

use std::fmt;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::header::{HeaderName, HeaderValue},
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::compiler::{HeaderSink, SecureHeaders};
use crate::config::HeaderPolicy;

/// This request's CSP nonce, exposed as a request extension.
///
/// Handlers that render inline `<script>`/`<style>` tags read the value
/// here; it is guaranteed to match the `'nonce-…'` source emitted on the
/// same response.
#[derive(Clone, Debug)]
pub struct CspNonce(String);

impl CspNonce {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CspNonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl HeaderSink for HeaderMap {
    type Error = axum::http::Error;

    fn set_header(&mut self, name: &'static str, value: &str) -> Result<(), Self::Error> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.insert(name, value);
        Ok(())
    }
}

/// Middleware function applying compiled security headers to the response.
///
/// One compiler instance is constructed per request, so every request gets
/// its own nonce. When the CSP family is enabled the nonce is made
/// available to handlers through the [`CspNonce`] extension before the
/// inner service runs.
pub async fn secure_headers_middleware(
    State(policy): State<Arc<HeaderPolicy>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let compiler = SecureHeaders::new((*policy).clone());

    if compiler.policy().csp.enable {
        request
            .extensions_mut()
            .insert(CspNonce(compiler.nonce().to_string()));
    }

    let mut response = next.run(request).await;

    if let Err(error) = compiler.send(response.headers_mut()) {
        tracing::error!(error = %error, "Failed to apply security headers");
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_map_sink_applies_canonical_names() {
        let compiler = SecureHeaders::new(HeaderPolicy::default());
        let mut map = HeaderMap::new();
        compiler.send(&mut map).unwrap();

        assert_eq!(map.get("x-content-type-options").unwrap(), "nosniff");
        assert_eq!(map.get("referrer-policy").unwrap(), "no-referrer");
        assert!(!map.contains_key("server"));
    }

    #[test]
    fn test_header_map_sink_rejects_invalid_value() {
        let policy: HeaderPolicy = toml::from_str("server = \"bad\\nvalue\"\n").unwrap();
        let compiler = SecureHeaders::new(policy);
        let mut map = HeaderMap::new();
        assert!(compiler.send(&mut map).is_err());
    }
}
