//! Integration tests for policy compilation.

use std::path::Path;

use secure_headers::{HeaderPolicy, PolicyError, SecureHeaders};

fn policy(doc: &str) -> HeaderPolicy {
    toml::from_str(doc).expect("policy document should parse")
}

fn bundled_config() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("config/secure-headers.toml")
}

#[test]
fn test_default_policy_baseline() {
    let headers = SecureHeaders::new(HeaderPolicy::default()).headers();

    assert_eq!(headers.get("X-Content-Type-Options"), Some("nosniff"));
    assert_eq!(headers.get("Referrer-Policy"), Some("no-referrer"));
    assert_eq!(headers.get("X-Frame-Options"), Some("sameorigin"));
}

#[test]
fn test_disable_header() {
    let headers = SecureHeaders::new(policy("x-download-options = false\n")).headers();

    assert!(headers.contains("X-Frame-Options"));
    assert!(!headers.contains("X-Download-Options"));
}

#[test]
fn test_load_from_file() {
    let headers = SecureHeaders::from_file(bundled_config())
        .expect("bundled config should load")
        .headers();

    assert!(headers.contains("Feature-Policy"));
    assert!(headers.contains("X-XSS-Protection"));
}

#[test]
fn test_load_from_json_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/secure-headers.json");
    let compiler = SecureHeaders::from_file(path).expect("JSON fixture should load");
    let headers = compiler.headers();

    assert_eq!(headers.get("Server"), Some("Example"));
    assert!(!headers.contains("X-Download-Options"));
    assert_eq!(
        headers.get("Strict-Transport-Security"),
        Some("max-age=63072000; includeSubDomains")
    );
    assert_eq!(
        headers.get("Content-Security-Policy"),
        Some(
            format!(
                "default-src 'self'; script-src 'self' 'nonce-{}'",
                compiler.nonce()
            )
            .as_str()
        )
    );
}

#[test]
fn test_file_not_found() {
    let err = SecureHeaders::from_file("/definitely/not-found.toml").unwrap_err();
    assert!(matches!(err, PolicyError::NotFound(_)));
}

#[test]
fn test_server_header() {
    let headers = SecureHeaders::new(HeaderPolicy::default()).headers();
    assert!(!headers.contains("Server"));

    let headers = SecureHeaders::new(policy("server = \"Example\"\n")).headers();
    assert_eq!(headers.get("Server"), Some("Example"));

    // An empty override never produces a nameless header.
    let headers = SecureHeaders::new(policy("server = \"\"\n")).headers();
    assert!(!headers.contains("Server"));
}

#[test]
fn test_x_powered_by_header() {
    let headers = SecureHeaders::new(HeaderPolicy::default()).headers();
    assert!(!headers.contains("X-Powered-By"));

    let headers = SecureHeaders::new(policy("x-powered-by = \"Example\"\n")).headers();
    assert_eq!(headers.get("X-Powered-By"), Some("Example"));

    // Legacy spelling still resolves to the canonical header name.
    let headers = SecureHeaders::new(policy("x-power-by = \"Example\"\n")).headers();
    assert_eq!(headers.get("X-Powered-By"), Some("Example"));

    // When both are present, the canonical key wins.
    let headers = SecureHeaders::new(policy(
        "x-powered-by = \"Canonical\"\nx-power-by = \"Legacy\"\n",
    ))
    .headers();
    assert_eq!(headers.get("X-Powered-By"), Some("Canonical"));

    // Disabling the canonical key suppresses even a configured legacy alias.
    let headers = SecureHeaders::new(policy(
        "x-powered-by = false\nx-power-by = \"Legacy\"\n",
    ))
    .headers();
    assert!(!headers.contains("X-Powered-By"));
}

#[test]
fn test_content_security_policy() {
    // Enabled but empty composes nothing.
    let headers = SecureHeaders::new(policy("[csp]\nenable = true\n")).headers();
    assert!(!headers.contains("Content-Security-Policy"));

    let enabled = r#"
        [csp]
        enable = true

        [csp.default-src]
        self = true
    "#;
    let headers = SecureHeaders::new(policy(enabled)).headers();
    assert_eq!(
        headers.get("Content-Security-Policy"),
        Some("default-src 'self'")
    );

    // Report-only switches the name; the two are mutually exclusive.
    let report_only = r#"
        [csp]
        enable = true
        report-only = true

        [csp.default-src]
        self = true
    "#;
    let headers = SecureHeaders::new(policy(report_only)).headers();
    assert!(headers.contains("Content-Security-Policy-Report-Only"));
    assert!(!headers.contains("Content-Security-Policy"));

    let disabled = r#"
        [csp]
        enable = false

        [csp.default-src]
        self = true
    "#;
    let headers = SecureHeaders::new(policy(disabled)).headers();
    assert!(!headers.contains("Content-Security-Policy"));
    assert!(!headers.contains("Content-Security-Policy-Report-Only"));
}

#[test]
fn test_content_security_policy_nonce() {
    let doc = r#"
        [csp]
        enable = true

        [csp.script-src]
        nonce = true
    "#;

    let compiler = SecureHeaders::new(policy(doc));
    let nonce = compiler.nonce().to_string();
    let headers = compiler.headers();

    assert_eq!(
        headers.get("Content-Security-Policy"),
        Some(format!("script-src 'nonce-{}'", nonce).as_str())
    );
}

#[test]
fn test_nonce_is_stable_within_one_compiler() {
    let doc = r#"
        [csp]
        enable = true

        [csp.script-src]
        nonce = true
    "#;

    let compiler = SecureHeaders::new(policy(doc));
    let first = compiler.headers();
    for _ in 0..10 {
        assert_eq!(compiler.headers(), first);
    }
}

#[test]
fn test_nonce_is_fresh_per_compiler() {
    let nonces: Vec<String> = (0..10)
        .map(|_| {
            SecureHeaders::new(HeaderPolicy::default())
                .nonce()
                .to_string()
        })
        .collect();

    for (i, a) in nonces.iter().enumerate() {
        for b in nonces.iter().skip(i + 1) {
            assert_ne!(a, b, "nonce collision across compiler instances");
        }
    }
}

#[test]
fn test_feature_policy() {
    let doc = r#"
        [feature-policy]
        enable = true

        [feature-policy.camera]
        none = true

        [feature-policy.fullscreen]
        self = true
    "#;
    let headers = SecureHeaders::new(policy(doc)).headers();
    assert_eq!(
        headers.get("Feature-Policy"),
        Some("camera 'none'; fullscreen 'self'")
    );
    assert!(!headers.contains("Permissions-Policy"));

    let permissions = r#"
        [feature-policy]
        enable = true
        use-permissions-policy-header = true

        [feature-policy.camera]
        none = true

        [feature-policy.fullscreen]
        self = true
    "#;
    let headers = SecureHeaders::new(policy(permissions)).headers();
    assert_eq!(
        headers.get("Permissions-Policy"),
        Some("camera=(); fullscreen=(self)")
    );
    assert!(!headers.contains("Feature-Policy"));

    let disabled = r#"
        [feature-policy]
        enable = false

        [feature-policy.camera]
        none = true
    "#;
    let headers = SecureHeaders::new(policy(disabled)).headers();
    assert!(!headers.contains("Feature-Policy"));
    assert!(!headers.contains("Permissions-Policy"));
}

#[test]
fn test_strict_transport_security() {
    let headers =
        SecureHeaders::new(policy("[hsts]\nenable = true\nmax-age = 31536000\n")).headers();
    assert_eq!(
        headers.get("Strict-Transport-Security"),
        Some("max-age=31536000")
    );

    let full = r#"
        [hsts]
        enable = true
        max-age = 31536000
        include-sub-domains = true
        preload = true
    "#;
    let headers = SecureHeaders::new(policy(full)).headers();
    assert_eq!(
        headers.get("Strict-Transport-Security"),
        Some("max-age=31536000; includeSubDomains; preload")
    );

    let headers = SecureHeaders::new(policy("[hsts]\nenable = false\n")).headers();
    assert!(!headers.contains("Strict-Transport-Security"));
}

#[test]
fn test_expect_ct() {
    let headers = SecureHeaders::new(policy("[expect-ct]\nenable = true\n")).headers();
    assert_eq!(headers.get("Expect-CT"), Some("max-age=2147483648"));

    let headers = SecureHeaders::new(policy("[expect-ct]\nenable = false\n")).headers();
    assert!(!headers.contains("Expect-CT"));
}

#[test]
fn test_clear_site_data() {
    let headers = SecureHeaders::new(policy("[clear-site-data]\nenable = true\n")).headers();
    assert_eq!(
        headers.get("Clear-Site-Data"),
        Some("\"cache\", \"cookies\", \"storage\", \"executionContexts\"")
    );

    let headers =
        SecureHeaders::new(policy("[clear-site-data]\nenable = true\nall = true\n")).headers();
    assert_eq!(headers.get("Clear-Site-Data"), Some("\"*\""));

    let headers = SecureHeaders::new(policy("[clear-site-data]\nenable = false\n")).headers();
    assert!(!headers.contains("Clear-Site-Data"));
}

#[test]
fn test_compilation_is_deterministic() {
    let compiler = SecureHeaders::from_file(bundled_config()).expect("bundled config should load");

    let first = compiler.headers();
    let second = compiler.headers();
    assert_eq!(first, second);

    let names: Vec<&str> = first.iter().map(|(name, _)| name).collect();
    assert_eq!(
        names,
        vec![
            "X-Content-Type-Options",
            "X-Download-Options",
            "X-Frame-Options",
            "X-Permitted-Cross-Domain-Policies",
            "X-XSS-Protection",
            "Referrer-Policy",
            "Feature-Policy",
        ]
    );
}
