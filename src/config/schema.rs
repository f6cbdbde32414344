//! Policy schema definitions.
//!
//! This module defines the complete policy configuration structure for the
//! header compiler. All types deserialize with Serde from config files or
//! in-memory documents; the compiler never mutates a loaded policy.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// Root policy for one compilation run.
///
/// Top-level keys map 1:1 to header families. Every field has a default so
/// a minimal (or empty) document yields the baseline header set.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct HeaderPolicy {
    /// `Server` override. Emitted only when set to a non-empty string.
    pub server: Setting<String>,

    /// `X-Content-Type-Options`. Defaults to `nosniff`.
    pub x_content_type_options: Setting<String>,

    /// `X-Download-Options`. Defaults to `noopen`.
    pub x_download_options: Setting<String>,

    /// `X-Frame-Options`. Defaults to `sameorigin`.
    pub x_frame_options: Setting<String>,

    /// `X-Permitted-Cross-Domain-Policies`. Defaults to `none`.
    pub x_permitted_cross_domain_policies: Setting<String>,

    /// `X-Powered-By` override. Emitted only when set to a non-empty string.
    pub x_powered_by: Setting<String>,

    /// Legacy spelling of `x-powered-by`, kept for backward compatibility.
    /// Consulted only when the canonical key is unset.
    pub x_power_by: Setting<String>,

    /// `X-XSS-Protection`. Defaults to `1; mode=block`.
    pub x_xss_protection: Setting<String>,

    /// `Referrer-Policy`. Defaults to `no-referrer`.
    pub referrer_policy: Setting<String>,

    /// `Clear-Site-Data` settings.
    pub clear_site_data: ClearSiteDataConfig,

    /// `Strict-Transport-Security` settings.
    pub hsts: HstsConfig,

    /// `Expect-CT` settings.
    pub expect_ct: ExpectCtConfig,

    /// `Feature-Policy` / `Permissions-Policy` settings.
    pub feature_policy: FeaturePolicyConfig,

    /// `Content-Security-Policy` settings.
    pub csp: CspConfig,
}

/// Tri-state for a configurable header value.
///
/// Deserialization normalizes the off-sentinel conventions of the source
/// document: explicit `null` and `false` both mean [`Setting::Disabled`],
/// `true` and a missing key mean [`Setting::Unset`] (fall back to the
/// family default), and any other value is [`Setting::Enabled`].
///
/// TOML cannot express `null`, so `false` is the portable off sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting<T> {
    /// Explicitly configured value.
    Enabled(T),
    /// Explicitly switched off; the header is suppressed.
    Disabled,
    /// Not configured; the family default applies.
    Unset,
}

impl<T> Default for Setting<T> {
    fn default() -> Self {
        Setting::Unset
    }
}

impl<T> Setting<T> {
    /// The configured value, if one was set.
    pub fn as_enabled(&self) -> Option<&T> {
        match self {
            Setting::Enabled(value) => Some(value),
            _ => None,
        }
    }

    /// Whether this setting carries the off sentinel.
    pub fn is_disabled(&self) -> bool {
        matches!(self, Setting::Disabled)
    }
}

impl<'de, T> Deserialize<'de> for Setting<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw<T> {
            Flag(bool),
            Value(T),
        }

        Ok(match Option::<Raw<T>>::deserialize(deserializer)? {
            None | Some(Raw::Flag(false)) => Setting::Disabled,
            Some(Raw::Flag(true)) => Setting::Unset,
            Some(Raw::Value(value)) => Setting::Enabled(value),
        })
    }
}

/// Ordered token → enabled-flag mapping.
///
/// Used for CSP directive sources and feature-policy targets. Declaration
/// order of the source document is preserved so composed values are
/// deterministic. Tokens are not validated against the CSP grammar;
/// unrecognized tokens pass through to the composed value verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceList {
    tokens: Vec<(String, bool)>,
}

impl SourceList {
    /// Enabled tokens, in declaration order.
    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.tokens
            .iter()
            .filter(|(_, on)| *on)
            .map(|(token, _)| token.as_str())
    }

    /// Whether any token is enabled.
    pub fn has_enabled(&self) -> bool {
        self.tokens.iter().any(|(_, on)| *on)
    }

    /// Whether a specific token is enabled.
    pub fn is_enabled(&self, token: &str) -> bool {
        self.tokens
            .iter()
            .any(|(candidate, on)| *on && candidate == token)
    }
}

impl FromIterator<(String, bool)> for SourceList {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().collect(),
        }
    }
}

impl<'de> Deserialize<'de> for SourceList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SourceListVisitor;

        impl<'de> Visitor<'de> for SourceListVisitor {
            type Value = SourceList;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of source tokens to booleans")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut tokens = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, bool>()? {
                    tokens.push(entry);
                }
                Ok(SourceList { tokens })
            }
        }

        deserializer.deserialize_map(SourceListVisitor)
    }
}

/// `Strict-Transport-Security` configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct HstsConfig {
    /// Emit the header at all.
    pub enable: bool,

    /// `max-age` in seconds.
    pub max_age: u64,

    /// Append `includeSubDomains`.
    pub include_sub_domains: bool,

    /// Append `preload`.
    pub preload: bool,
}

impl Default for HstsConfig {
    fn default() -> Self {
        Self {
            enable: false,
            max_age: 31_536_000, // one year
            include_sub_domains: false,
            preload: false,
        }
    }
}

/// `Expect-CT` configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExpectCtConfig {
    /// Emit the header at all.
    pub enable: bool,

    /// `max-age` in seconds.
    pub max_age: u64,

    /// Append `enforce`.
    pub enforce: bool,

    /// Violation report endpoint, appended as `report-uri="…"`.
    pub report_uri: Option<String>,
}

impl Default for ExpectCtConfig {
    fn default() -> Self {
        Self {
            enable: false,
            max_age: 2_147_483_648,
            enforce: false,
            report_uri: None,
        }
    }
}

/// `Clear-Site-Data` configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ClearSiteDataConfig {
    /// Emit the header at all.
    pub enable: bool,

    /// Clear everything (`"*"`); overrides the individual types.
    pub all: bool,

    pub cache: bool,
    pub cookies: bool,
    pub storage: bool,
    pub execution_contexts: bool,
}

impl Default for ClearSiteDataConfig {
    fn default() -> Self {
        Self {
            enable: false,
            all: false,
            cache: true,
            cookies: true,
            storage: true,
            execution_contexts: true,
        }
    }
}

/// `Feature-Policy` / `Permissions-Policy` configuration.
///
/// Each feature maps a browser capability to an allowlist. The recognized
/// target tokens are `self`, `none`, `src`, `*`, and origins; origins pass
/// through verbatim. A feature with no enabled targets contributes nothing.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct FeaturePolicyConfig {
    /// Emit the header at all.
    pub enable: bool,

    /// Emit `Permissions-Policy` (structured syntax) instead of the legacy
    /// `Feature-Policy` header. Exactly one of the two is ever sent.
    pub use_permissions_policy_header: bool,

    pub accelerometer: SourceList,
    pub ambient_light_sensor: SourceList,
    pub autoplay: SourceList,
    pub battery: SourceList,
    pub camera: SourceList,
    pub display_capture: SourceList,
    pub document_domain: SourceList,
    pub encrypted_media: SourceList,
    pub fullscreen: SourceList,
    pub geolocation: SourceList,
    pub gyroscope: SourceList,
    pub magnetometer: SourceList,
    pub microphone: SourceList,
    pub midi: SourceList,
    pub payment: SourceList,
    pub picture_in_picture: SourceList,
    pub publickey_credentials_get: SourceList,
    pub screen_wake_lock: SourceList,
    pub sync_xhr: SourceList,
    pub usb: SourceList,
    pub web_share: SourceList,
    pub xr_spatial_tracking: SourceList,
}

impl FeaturePolicyConfig {
    /// Configured features in emission order.
    pub(crate) fn features(&self) -> [(&'static str, &SourceList); 22] {
        [
            ("accelerometer", &self.accelerometer),
            ("ambient-light-sensor", &self.ambient_light_sensor),
            ("autoplay", &self.autoplay),
            ("battery", &self.battery),
            ("camera", &self.camera),
            ("display-capture", &self.display_capture),
            ("document-domain", &self.document_domain),
            ("encrypted-media", &self.encrypted_media),
            ("fullscreen", &self.fullscreen),
            ("geolocation", &self.geolocation),
            ("gyroscope", &self.gyroscope),
            ("magnetometer", &self.magnetometer),
            ("microphone", &self.microphone),
            ("midi", &self.midi),
            ("payment", &self.payment),
            ("picture-in-picture", &self.picture_in_picture),
            ("publickey-credentials-get", &self.publickey_credentials_get),
            ("screen-wake-lock", &self.screen_wake_lock),
            ("sync-xhr", &self.sync_xhr),
            ("usb", &self.usb),
            ("web-share", &self.web_share),
            ("xr-spatial-tracking", &self.xr_spatial_tracking),
        ]
    }
}

/// `Content-Security-Policy` configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct CspConfig {
    /// Emit the header at all.
    pub enable: bool,

    /// Emit `Content-Security-Policy-Report-Only` instead of the enforced
    /// header. Exactly one of the two names is ever sent.
    pub report_only: bool,

    /// Violation report endpoint, composed as `report-uri <uri>`.
    pub report_uri: Option<String>,

    /// Standalone `upgrade-insecure-requests` directive.
    pub upgrade_insecure_requests: bool,

    /// Standalone `block-all-mixed-content` directive.
    pub block_all_mixed_content: bool,

    pub default_src: SourceList,
    pub script_src: SourceList,
    pub style_src: SourceList,
    pub img_src: SourceList,
    pub font_src: SourceList,
    pub connect_src: SourceList,
    pub media_src: SourceList,
    pub object_src: SourceList,
    pub frame_src: SourceList,
    pub child_src: SourceList,
    pub worker_src: SourceList,
    pub manifest_src: SourceList,
    pub base_uri: SourceList,
    pub form_action: SourceList,
    pub frame_ancestors: SourceList,
}

impl CspConfig {
    /// Source-list directives in emission order.
    pub(crate) fn directives(&self) -> [(&'static str, &SourceList); 15] {
        [
            ("default-src", &self.default_src),
            ("script-src", &self.script_src),
            ("style-src", &self.style_src),
            ("img-src", &self.img_src),
            ("font-src", &self.font_src),
            ("connect-src", &self.connect_src),
            ("media-src", &self.media_src),
            ("object-src", &self.object_src),
            ("frame-src", &self.frame_src),
            ("child-src", &self.child_src),
            ("worker-src", &self.worker_src),
            ("manifest-src", &self.manifest_src),
            ("base-uri", &self.base_uri),
            ("form-action", &self.form_action),
            ("frame-ancestors", &self.frame_ancestors),
        ]
    }
}
