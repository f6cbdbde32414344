//! Per-family header resolution rules.
//!
//! Each resolver reads one family's configuration section, applies its
//! enable/disable and aliasing rules, and decides the final header name and
//! value, or omission. Value composition is delegated to
//! [`compose`](crate::compiler::compose).

use crate::compiler::compose;
use crate::compiler::nonce::NonceProvider;
use crate::config::schema::{
    ClearSiteDataConfig, CspConfig, ExpectCtConfig, FeaturePolicyConfig, HstsConfig, Setting,
};

// Canonical header names. The resolved set preserves this casing; the HTTP
// sink may normalize it on the wire.
pub(crate) const SERVER: &str = "Server";
pub(crate) const X_CONTENT_TYPE_OPTIONS: &str = "X-Content-Type-Options";
pub(crate) const X_DOWNLOAD_OPTIONS: &str = "X-Download-Options";
pub(crate) const X_FRAME_OPTIONS: &str = "X-Frame-Options";
pub(crate) const X_PERMITTED_CROSS_DOMAIN_POLICIES: &str = "X-Permitted-Cross-Domain-Policies";
pub(crate) const X_POWERED_BY: &str = "X-Powered-By";
pub(crate) const X_XSS_PROTECTION: &str = "X-XSS-Protection";
pub(crate) const REFERRER_POLICY: &str = "Referrer-Policy";
pub(crate) const CLEAR_SITE_DATA: &str = "Clear-Site-Data";
pub(crate) const STRICT_TRANSPORT_SECURITY: &str = "Strict-Transport-Security";
pub(crate) const EXPECT_CT: &str = "Expect-CT";
pub(crate) const FEATURE_POLICY: &str = "Feature-Policy";
pub(crate) const PERMISSIONS_POLICY: &str = "Permissions-Policy";
pub(crate) const CONTENT_SECURITY_POLICY: &str = "Content-Security-Policy";
pub(crate) const CONTENT_SECURITY_POLICY_REPORT_ONLY: &str =
    "Content-Security-Policy-Report-Only";

/// Resolve a simple value header with a family default.
///
/// The off sentinel always suppresses; an explicitly configured empty
/// string suppresses too (an empty header value is never emitted).
pub(crate) fn simple(setting: &Setting<String>, default: &'static str) -> Option<String> {
    match setting {
        Setting::Enabled(value) if !value.is_empty() => Some(value.clone()),
        Setting::Enabled(_) | Setting::Disabled => None,
        Setting::Unset => Some(default.to_string()),
    }
}

/// Resolve a header that is only emitted when explicitly configured.
pub(crate) fn explicit(setting: &Setting<String>) -> Option<String> {
    setting
        .as_enabled()
        .filter(|value| !value.is_empty())
        .cloned()
}

/// Resolve an explicitly configured header through an ordered list of
/// candidate keys. The first explicitly configured candidate wins, so the
/// canonical spelling takes precedence over its legacy alias. An off
/// sentinel on any candidate suppresses the header outright; later
/// candidates are not consulted.
pub(crate) fn aliased(candidates: &[&Setting<String>]) -> Option<String> {
    for setting in candidates {
        if setting.is_disabled() {
            return None;
        }
        if let Some(value) = explicit(setting) {
            return Some(value);
        }
    }
    None
}

pub(crate) fn hsts(config: &HstsConfig) -> Option<String> {
    if !config.enable {
        return None;
    }
    Some(compose::hsts_value(config))
}

pub(crate) fn expect_ct(config: &ExpectCtConfig) -> Option<String> {
    if !config.enable {
        return None;
    }
    Some(compose::expect_ct_value(config))
}

pub(crate) fn clear_site_data(config: &ClearSiteDataConfig) -> Option<String> {
    if !config.enable {
        return None;
    }
    compose::clear_site_data_value(config)
}

/// Resolve the feature-policy family to exactly one of its two header
/// names, never both.
pub(crate) fn feature_policy(config: &FeaturePolicyConfig) -> Option<(&'static str, String)> {
    if !config.enable {
        return None;
    }
    if config.use_permissions_policy_header {
        compose::permissions_policy_value(config).map(|value| (PERMISSIONS_POLICY, value))
    } else {
        compose::feature_policy_value(config).map(|value| (FEATURE_POLICY, value))
    }
}

/// Resolve the CSP family to its enforced or report-only header name,
/// never both.
pub(crate) fn csp(config: &CspConfig, nonce: &NonceProvider) -> Option<(&'static str, String)> {
    if !config.enable {
        return None;
    }
    let name = if config.report_only {
        CONTENT_SECURITY_POLICY_REPORT_ONLY
    } else {
        CONTENT_SECURITY_POLICY
    };
    compose::csp_value(config, nonce).map(|value| (name, value))
}
