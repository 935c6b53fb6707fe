//! Relying-party configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_CLIENT_ID: &str = "oidc-demo-client";
pub const DEFAULT_POST_LOGOUT_REDIRECT_URI: &str = "http://localhost:8080/";
pub const DEFAULT_CALLBACK_PREFIX: &str = "/login/oauth2/code/";
pub const DEFAULT_SESSION_IDLE_TIMEOUT_SECS: u64 = 1800;
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required env var {var}")]
    Missing { var: &'static str },
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Provider-facing settings consumed by the session-state handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OidcConfig {
    /// Provider base URL, without trailing slash.
    pub auth_server_url: String,
    pub realm: String,
    pub client_id: String,
    /// URL the browser loads to poll provider session status.
    pub check_session_iframe: String,
    pub post_logout_redirect_uri: String,
    /// Path prefix of the authorization-response redirect.
    pub callback_prefix: String,
}

impl OidcConfig {
    /// End-session endpoint for the configured realm.
    #[must_use]
    pub fn end_session_endpoint(&self) -> String {
        format!("{}/realms/{}/protocol/openid-connect/logout", self.auth_server_url, self.realm)
    }
}

/// Full application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub oidc: OidcConfig,
    pub session_idle_timeout: Duration,
    pub cookie_secure: bool,
    pub dev_auth_bypass: bool,
    pub port: u16,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `OIDC_AUTH_SERVER_URL`
    /// - `OIDC_REALM`
    ///
    /// Optional:
    /// - `OIDC_CLIENT_ID`: default `oidc-demo-client`
    /// - `OIDC_CHECK_SESSION_IFRAME`: derived from server URL and realm
    /// - `OIDC_POST_LOGOUT_REDIRECT_URI`: default `http://localhost:8080/`
    /// - `OIDC_CALLBACK_PREFIX`: default `/login/oauth2/code/`
    /// - `SESSION_IDLE_TIMEOUT_SECS`: default 1800
    /// - `COOKIE_SECURE`: inferred from the post-logout URI scheme when absent
    /// - `DEV_AUTH_BYPASS`: default false
    /// - `PORT`: default 8080
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value is malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let auth_server_url = get("OIDC_AUTH_SERVER_URL")
            .ok_or(ConfigError::Missing { var: "OIDC_AUTH_SERVER_URL" })?
            .trim_end_matches('/')
            .to_owned();
        let realm = get("OIDC_REALM").ok_or(ConfigError::Missing { var: "OIDC_REALM" })?;
        let client_id = get("OIDC_CLIENT_ID").unwrap_or_else(|| DEFAULT_CLIENT_ID.to_owned());
        let check_session_iframe = get("OIDC_CHECK_SESSION_IFRAME").unwrap_or_else(|| {
            format!("{auth_server_url}/realms/{realm}/protocol/openid-connect/login-status-iframe.html")
        });
        let post_logout_redirect_uri =
            get("OIDC_POST_LOGOUT_REDIRECT_URI").unwrap_or_else(|| DEFAULT_POST_LOGOUT_REDIRECT_URI.to_owned());

        let callback_prefix = get("OIDC_CALLBACK_PREFIX").unwrap_or_else(|| DEFAULT_CALLBACK_PREFIX.to_owned());
        if !callback_prefix.starts_with('/') {
            return Err(ConfigError::Invalid { var: "OIDC_CALLBACK_PREFIX", value: callback_prefix });
        }

        let idle_secs =
            parse_or("SESSION_IDLE_TIMEOUT_SECS", get("SESSION_IDLE_TIMEOUT_SECS"), DEFAULT_SESSION_IDLE_TIMEOUT_SECS)?;
        let port = parse_or("PORT", get("PORT"), DEFAULT_PORT)?;

        let cookie_secure = match get("COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { var: "COOKIE_SECURE", value: raw })?,
            None => post_logout_redirect_uri.starts_with("https://"),
        };
        let dev_auth_bypass = match get("DEV_AUTH_BYPASS") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { var: "DEV_AUTH_BYPASS", value: raw })?,
            None => false,
        };

        Ok(Self {
            oidc: OidcConfig {
                auth_server_url,
                realm,
                client_id,
                check_session_iframe,
                post_logout_redirect_uri,
                callback_prefix,
            },
            session_idle_timeout: Duration::from_secs(idle_secs),
            cookie_secure,
            dev_auth_bypass,
            port,
        })
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_or<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match raw {
        Some(value) => value.parse::<T>().map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
