//! Directive composition.
//!
//! Pure functions turning a family's configuration sub-structure into one
//! composed header value. Gating (enable flags, header name selection) is
//! the resolver's job; composition only builds strings and reports "empty"
//! so the caller can omit the header.

use crate::compiler::nonce::NonceProvider;
use crate::config::schema::{
    ClearSiteDataConfig, CspConfig, ExpectCtConfig, FeaturePolicyConfig, HstsConfig, SourceList,
};

/// CSP source keywords that must be single-quoted in the composed value.
const CSP_KEYWORDS: &[&str] = &[
    "self",
    "unsafe-inline",
    "unsafe-eval",
    "unsafe-hashes",
    "strict-dynamic",
    "wasm-unsafe-eval",
    "report-sample",
    "none",
];

/// Feature-policy target keywords that the legacy syntax single-quotes.
const FEATURE_KEYWORDS: &[&str] = &["self", "none", "src"];

/// Compose the Content-Security-Policy value, or `None` when no directive
/// survives.
///
/// Directives are emitted in schema declaration order: source-list
/// directives first, then the standalone boolean directives, then
/// `report-uri` last. A directive with zero enabled sources is dropped.
pub(crate) fn csp_value(csp: &CspConfig, nonce: &NonceProvider) -> Option<String> {
    let mut directives: Vec<String> = Vec::new();

    for (name, sources) in csp.directives() {
        let tokens: Vec<String> = sources
            .enabled()
            .map(|token| csp_source(token, nonce))
            .collect();
        if tokens.is_empty() {
            continue;
        }
        directives.push(format!("{} {}", name, tokens.join(" ")));
    }

    if csp.upgrade_insecure_requests {
        directives.push("upgrade-insecure-requests".to_string());
    }
    if csp.block_all_mixed_content {
        directives.push("block-all-mixed-content".to_string());
    }
    if let Some(uri) = csp.report_uri.as_deref().filter(|uri| !uri.is_empty()) {
        directives.push(format!("report-uri {}", uri));
    }

    if directives.is_empty() {
        None
    } else {
        Some(directives.join("; "))
    }
}

/// Render one CSP source token.
///
/// Keywords and hash sources are single-quoted, the `nonce` token expands
/// through the provider, and everything else (schemes, hosts) passes
/// through verbatim.
fn csp_source(token: &str, nonce: &NonceProvider) -> String {
    if token == "nonce" {
        return format!("'nonce-{}'", nonce.value());
    }
    if CSP_KEYWORDS.contains(&token)
        || token.starts_with("nonce-")
        || token.starts_with("sha256-")
        || token.starts_with("sha384-")
        || token.starts_with("sha512-")
    {
        return format!("'{}'", token);
    }
    token.to_string()
}

/// Compose the legacy Feature-Policy value, or `None` when no feature
/// survives.
pub(crate) fn feature_policy_value(config: &FeaturePolicyConfig) -> Option<String> {
    let features: Vec<String> = config
        .features()
        .into_iter()
        .filter_map(|(name, targets)| {
            let rendered: Vec<String> = targets.enabled().map(feature_target).collect();
            if rendered.is_empty() {
                None
            } else {
                Some(format!("{} {}", name, rendered.join(" ")))
            }
        })
        .collect();

    if features.is_empty() {
        None
    } else {
        Some(features.join("; "))
    }
}

fn feature_target(token: &str) -> String {
    if FEATURE_KEYWORDS.contains(&token) {
        format!("'{}'", token)
    } else {
        token.to_string()
    }
}

/// Compose the Permissions-Policy value (structured syntax), or `None` when
/// no feature survives.
///
/// `*` and `none` are complete allowlist values in this syntax: `*` wins
/// over `none`, which wins over an explicit list.
pub(crate) fn permissions_policy_value(config: &FeaturePolicyConfig) -> Option<String> {
    let features: Vec<String> = config
        .features()
        .into_iter()
        .filter_map(|(name, targets)| {
            permission_allowlist(targets).map(|allowlist| format!("{}={}", name, allowlist))
        })
        .collect();

    if features.is_empty() {
        None
    } else {
        Some(features.join("; "))
    }
}

fn permission_allowlist(targets: &SourceList) -> Option<String> {
    if !targets.has_enabled() {
        return None;
    }
    if targets.is_enabled("*") {
        return Some("*".to_string());
    }
    if targets.is_enabled("none") {
        return Some("()".to_string());
    }

    let rendered: Vec<String> = targets
        .enabled()
        .map(|token| {
            // `self` and `src` stay bare keywords; origins are quoted strings.
            if token == "self" || token == "src" {
                token.to_string()
            } else {
                format!("\"{}\"", token)
            }
        })
        .collect();
    Some(format!("({})", rendered.join(" ")))
}

/// Compose the Strict-Transport-Security value.
pub(crate) fn hsts_value(config: &HstsConfig) -> String {
    let mut value = format!("max-age={}", config.max_age);
    if config.include_sub_domains {
        value.push_str("; includeSubDomains");
    }
    if config.preload {
        value.push_str("; preload");
    }
    value
}

/// Compose the Expect-CT value.
pub(crate) fn expect_ct_value(config: &ExpectCtConfig) -> String {
    let mut value = format!("max-age={}", config.max_age);
    if config.enforce {
        value.push_str(", enforce");
    }
    if let Some(uri) = config.report_uri.as_deref().filter(|uri| !uri.is_empty()) {
        value.push_str(&format!(", report-uri=\"{}\"", uri));
    }
    value
}

/// Compose the Clear-Site-Data value, or `None` when no type is selected.
pub(crate) fn clear_site_data_value(config: &ClearSiteDataConfig) -> Option<String> {
    if config.all {
        return Some("\"*\"".to_string());
    }

    let mut types: Vec<&str> = Vec::new();
    if config.cache {
        types.push("\"cache\"");
    }
    if config.cookies {
        types.push("\"cookies\"");
    }
    if config.storage {
        types.push("\"storage\"");
    }
    if config.execution_contexts {
        types.push("\"executionContexts\"");
    }

    if types.is_empty() {
        None
    } else {
        Some(types.join(", "))
    }
}
