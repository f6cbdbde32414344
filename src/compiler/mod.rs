//! Policy-to-header compilation subsystem.
//!
//! # Data Flow
//! ```text
//! HeaderPolicy (immutable)
//!     → resolve.rs (per-family enable/alias/name rules)
//!     → compose.rs (directive & source-list grammars)
//!     → nonce.rs (per-instance CSP nonce)
//!     → HeaderSet (ordered name → value)
//!     → HeaderSink (response boundary)
//! ```
//!
//! # Design Decisions
//! - One compiler instance per logical request; the nonce is instance state
//!   so concurrent requests can never observe each other's value
//! - Compilation is pure and synchronous; the only external resources are
//!   the OS RNG and the caller-supplied response sink
//! - Same policy + same nonce ⇒ byte-identical output

mod compose;
mod nonce;
mod resolve;

use std::path::Path;

use crate::config::schema::HeaderPolicy;
use crate::config::{load_policy, PolicyError};
use nonce::NonceProvider;

/// Ordered mapping from canonical header name to composed value.
///
/// Keys are unique; inserting an existing name overwrites its value while
/// keeping the original position. Built fresh on every compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(&'static str, String)>,
}

impl HeaderSet {
    fn insert(&mut self, name: &'static str, value: String) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Look up a header value by name (ASCII case-insensitive).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether a header is present (ASCII case-insensitive).
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate entries in resolution order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (*name, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for HeaderSet {
    type Item = (&'static str, String);
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Set-header capability of a response sink.
///
/// The compiler applies a resolved set through this trait and propagates
/// only the sink's own error; nothing is retried or deduplicated here.
pub trait HeaderSink {
    type Error;

    fn set_header(&mut self, name: &'static str, value: &str) -> Result<(), Self::Error>;
}

/// Per-request security header compiler.
///
/// Construct one instance per logical request: the CSP nonce is owned by
/// the instance, generated lazily on first use, and stable for the
/// instance's lifetime.
#[derive(Debug)]
pub struct SecureHeaders {
    policy: HeaderPolicy,
    nonce: NonceProvider,
}

impl SecureHeaders {
    /// Create a compiler over an in-memory policy.
    pub fn new(policy: HeaderPolicy) -> Self {
        Self {
            policy,
            nonce: NonceProvider::new(),
        }
    }

    /// Create a compiler from a policy file (TOML or JSON).
    ///
    /// A missing file surfaces as [`PolicyError::NotFound`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PolicyError> {
        Ok(Self::new(load_policy(path.as_ref())?))
    }

    /// The policy this compiler reads.
    pub fn policy(&self) -> &HeaderPolicy {
        &self.policy
    }

    /// This request's CSP nonce.
    ///
    /// Generated on first access and stable for the instance's lifetime, so
    /// inline `<script nonce="…">` tags rendered by the caller always match
    /// the emitted `'nonce-…'` source. Aborts if the OS randomness source
    /// is unavailable.
    pub fn nonce(&self) -> &str {
        self.nonce.value()
    }

    /// Compile the policy into the resolved header set.
    ///
    /// Families resolve in a fixed order and insert under canonical casing;
    /// omitted families leave no entry. Deterministic for a fixed policy
    /// and nonce.
    pub fn headers(&self) -> HeaderSet {
        let policy = &self.policy;
        let mut set = HeaderSet::default();

        if let Some(value) = resolve::explicit(&policy.server) {
            set.insert(resolve::SERVER, value);
        }
        if let Some(value) = resolve::simple(&policy.x_content_type_options, "nosniff") {
            set.insert(resolve::X_CONTENT_TYPE_OPTIONS, value);
        }
        if let Some(value) = resolve::simple(&policy.x_download_options, "noopen") {
            set.insert(resolve::X_DOWNLOAD_OPTIONS, value);
        }
        if let Some(value) = resolve::simple(&policy.x_frame_options, "sameorigin") {
            set.insert(resolve::X_FRAME_OPTIONS, value);
        }
        if let Some(value) = resolve::simple(&policy.x_permitted_cross_domain_policies, "none") {
            set.insert(resolve::X_PERMITTED_CROSS_DOMAIN_POLICIES, value);
        }
        if let Some(value) = resolve::aliased(&[&policy.x_powered_by, &policy.x_power_by]) {
            set.insert(resolve::X_POWERED_BY, value);
        }
        if let Some(value) = resolve::simple(&policy.x_xss_protection, "1; mode=block") {
            set.insert(resolve::X_XSS_PROTECTION, value);
        }
        if let Some(value) = resolve::simple(&policy.referrer_policy, "no-referrer") {
            set.insert(resolve::REFERRER_POLICY, value);
        }
        if let Some(value) = resolve::clear_site_data(&policy.clear_site_data) {
            set.insert(resolve::CLEAR_SITE_DATA, value);
        }
        if let Some(value) = resolve::hsts(&policy.hsts) {
            set.insert(resolve::STRICT_TRANSPORT_SECURITY, value);
        }
        if let Some(value) = resolve::expect_ct(&policy.expect_ct) {
            set.insert(resolve::EXPECT_CT, value);
        }
        if let Some((name, value)) = resolve::feature_policy(&policy.feature_policy) {
            set.insert(name, value);
        }
        if let Some((name, value)) = resolve::csp(&policy.csp, &self.nonce) {
            set.insert(name, value);
        }

        tracing::debug!(count = set.len(), "Compiled security headers");
        set
    }

    /// Compile and apply the header set to a response sink.
    pub fn send<S: HeaderSink>(&self, sink: &mut S) -> Result<(), S::Error> {
        for (name, value) in self.headers().iter() {
            sink.set_header(name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_set_overwrites_in_place() {
        let mut set = HeaderSet::default();
        set.insert("X-First", "one".to_string());
        set.insert("X-Second", "two".to_string());
        set.insert("X-First", "replaced".to_string());

        assert_eq!(set.len(), 2);
        assert_eq!(set.get("x-first"), Some("replaced"));
        let names: Vec<&str> = set.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["X-First", "X-Second"]);
    }

    #[test]
    fn test_default_policy_baseline() {
        let headers = SecureHeaders::new(HeaderPolicy::default()).headers();

        assert_eq!(headers.get("X-Content-Type-Options"), Some("nosniff"));
        assert_eq!(headers.get("X-Download-Options"), Some("noopen"));
        assert_eq!(headers.get("X-Frame-Options"), Some("sameorigin"));
        assert_eq!(
            headers.get("X-Permitted-Cross-Domain-Policies"),
            Some("none")
        );
        assert_eq!(headers.get("X-XSS-Protection"), Some("1; mode=block"));
        assert_eq!(headers.get("Referrer-Policy"), Some("no-referrer"));

        assert!(!headers.contains("Server"));
        assert!(!headers.contains("X-Powered-By"));
        assert!(!headers.contains("Content-Security-Policy"));
        assert!(!headers.contains("Strict-Transport-Security"));
        assert!(!headers.contains("Expect-CT"));
        assert!(!headers.contains("Clear-Site-Data"));
        assert!(!headers.contains("Feature-Policy"));
        assert!(!headers.contains("Permissions-Policy"));
    }

    #[test]
    fn test_send_applies_every_entry() {
        struct Recorder(Vec<(String, String)>);

        impl HeaderSink for Recorder {
            type Error = std::convert::Infallible;

            fn set_header(&mut self, name: &'static str, value: &str) -> Result<(), Self::Error> {
                self.0.push((name.to_string(), value.to_string()));
                Ok(())
            }
        }

        let compiler = SecureHeaders::new(HeaderPolicy::default());
        let mut sink = Recorder(Vec::new());
        compiler.send(&mut sink).unwrap();

        assert_eq!(sink.0.len(), compiler.headers().len());
        assert_eq!(sink.0[0].0, "X-Content-Type-Options");
    }
}
