use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key: &str| map.get(key).cloned()
}

fn required() -> Vec<(&'static str, &'static str)> {
    vec![("OIDC_AUTH_SERVER_URL", "https://idp.example.com"), ("OIDC_REALM", "demo")]
}

// =============================================================================
// AppConfig::from_lookup
// =============================================================================

#[test]
fn from_lookup_applies_defaults() {
    let cfg = AppConfig::from_lookup(lookup_from(&required())).unwrap();
    assert_eq!(cfg.oidc.auth_server_url, "https://idp.example.com");
    assert_eq!(cfg.oidc.realm, "demo");
    assert_eq!(cfg.oidc.client_id, DEFAULT_CLIENT_ID);
    assert_eq!(
        cfg.oidc.check_session_iframe,
        "https://idp.example.com/realms/demo/protocol/openid-connect/login-status-iframe.html"
    );
    assert_eq!(cfg.oidc.post_logout_redirect_uri, "http://localhost:8080/");
    assert_eq!(cfg.oidc.callback_prefix, "/login/oauth2/code/");
    assert_eq!(cfg.session_idle_timeout, Duration::from_secs(DEFAULT_SESSION_IDLE_TIMEOUT_SECS));
    assert!(!cfg.cookie_secure);
    assert!(!cfg.dev_auth_bypass);
    assert_eq!(cfg.port, DEFAULT_PORT);
}

#[test]
fn from_lookup_parses_overrides() {
    let mut pairs = required();
    pairs.extend([
        ("OIDC_CLIENT_ID", "portal"),
        ("OIDC_CHECK_SESSION_IFRAME", "https://idp.example.com/check"),
        ("OIDC_POST_LOGOUT_REDIRECT_URI", "https://app.example.com/"),
        ("OIDC_CALLBACK_PREFIX", "/auth/callback/"),
        ("SESSION_IDLE_TIMEOUT_SECS", "60"),
        ("DEV_AUTH_BYPASS", "yes"),
        ("PORT", "9000"),
    ]);
    let cfg = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
    assert_eq!(cfg.oidc.client_id, "portal");
    assert_eq!(cfg.oidc.check_session_iframe, "https://idp.example.com/check");
    assert_eq!(cfg.oidc.callback_prefix, "/auth/callback/");
    assert_eq!(cfg.session_idle_timeout, Duration::from_secs(60));
    assert!(cfg.dev_auth_bypass);
    assert_eq!(cfg.port, 9000);
    // Inferred from the https post-logout target.
    assert!(cfg.cookie_secure);
}

#[test]
fn from_lookup_trims_trailing_slash_from_server_url() {
    let cfg = AppConfig::from_lookup(lookup_from(&[
        ("OIDC_AUTH_SERVER_URL", "https://idp.example.com/"),
        ("OIDC_REALM", "demo"),
    ]))
    .unwrap();
    assert_eq!(cfg.oidc.auth_server_url, "https://idp.example.com");
    assert_eq!(
        cfg.oidc.end_session_endpoint(),
        "https://idp.example.com/realms/demo/protocol/openid-connect/logout"
    );
}

#[test]
fn from_lookup_missing_server_url_errors() {
    let err = AppConfig::from_lookup(lookup_from(&[("OIDC_REALM", "demo")])).unwrap_err();
    assert_eq!(err, ConfigError::Missing { var: "OIDC_AUTH_SERVER_URL" });
}

#[test]
fn from_lookup_blank_realm_counts_as_missing() {
    let err = AppConfig::from_lookup(lookup_from(&[
        ("OIDC_AUTH_SERVER_URL", "https://idp.example.com"),
        ("OIDC_REALM", "   "),
    ]))
    .unwrap_err();
    assert_eq!(err, ConfigError::Missing { var: "OIDC_REALM" });
}

#[test]
fn from_lookup_rejects_relative_callback_prefix() {
    let mut pairs = required();
    pairs.push(("OIDC_CALLBACK_PREFIX", "login/oauth2/code/"));
    let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
    assert!(err.to_string().contains("OIDC_CALLBACK_PREFIX"));
}

#[test]
fn from_lookup_rejects_bad_port() {
    let mut pairs = required();
    pairs.push(("PORT", "eighty"));
    let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { var: "PORT", value: "eighty".into() });
}

#[test]
fn from_lookup_explicit_cookie_secure_wins_over_inference() {
    let mut pairs = required();
    pairs.push(("OIDC_POST_LOGOUT_REDIRECT_URI", "https://app.example.com/"));
    pairs.push(("COOKIE_SECURE", "off"));
    let cfg = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();
    assert!(!cfg.cookie_secure);
}

#[test]
fn from_lookup_rejects_unparseable_bool() {
    let mut pairs = required();
    pairs.push(("DEV_AUTH_BYPASS", "maybe"));
    let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { var: "DEV_AUTH_BYPASS", value: "maybe".into() });
}

// =============================================================================
// parse_bool
// =============================================================================

#[test]
fn parse_bool_true_variants() {
    for val in ["1", "true", "yes", "on", "TRUE", "On", "  true  "] {
        assert_eq!(parse_bool(val), Some(true), "expected true for {val:?}");
    }
}

#[test]
fn parse_bool_false_variants() {
    for val in ["0", "false", "no", "off", "False"] {
        assert_eq!(parse_bool(val), Some(false), "expected false for {val:?}");
    }
}

#[test]
fn parse_bool_invalid_returns_none() {
    assert_eq!(parse_bool("maybe"), None);
    assert_eq!(parse_bool(""), None);
}
