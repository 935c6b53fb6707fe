//! Session-state resolution and the views built on top of it.
//!
//! DESIGN
//! ======
//! Providers are inconsistent about where `session_state` travels: some put
//! it on the authorization response, some embed it in the ID token, some do
//! both. Resolution walks an ordered list of sources and returns the first
//! hit, session slot first.

use serde::Serialize;

use crate::config::OidcConfig;
use crate::identity::{OidcUser, SESSION_STATE_CLAIM};

/// Inputs available to a session-state source.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Value captured on the session by the callback interceptor.
    pub session_value: Option<&'a str>,
    pub user: Option<&'a OidcUser>,
}

pub type SessionStateSource = fn(&ResolveContext<'_>) -> Option<String>;

/// Sources in precedence order.
pub const SESSION_STATE_SOURCES: &[SessionStateSource] = &[from_session, from_id_token_claim];

fn from_session(ctx: &ResolveContext<'_>) -> Option<String> {
    ctx.session_value.map(str::to_owned)
}

fn from_id_token_claim(ctx: &ResolveContext<'_>) -> Option<String> {
    ctx.user?
        .id_token
        .as_ref()?
        .claim_str(SESSION_STATE_CLAIM)
        .map(str::to_owned)
}

/// Current `session_state` for the caller, or `None` when no source has one.
#[must_use]
pub fn resolve_session_state(session_value: Option<&str>, user: Option<&OidcUser>) -> Option<String> {
    let ctx = ResolveContext { session_value, user };
    SESSION_STATE_SOURCES.iter().find_map(|source| source(&ctx))
}

// =============================================================================
// DASHBOARD
// =============================================================================

/// View model for the dashboard page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub username: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub session_state: Option<String>,
    pub check_session_iframe: String,
    pub client_id: String,
}

#[must_use]
pub fn render_dashboard(user: &OidcUser, session_value: Option<&str>, config: &OidcConfig) -> DashboardView {
    DashboardView {
        username: user.username().to_owned(),
        email: user.email.clone(),
        name: user.full_name.clone(),
        session_state: resolve_session_state(session_value, Some(user)),
        check_session_iframe: config.check_session_iframe.clone(),
        client_id: config.client_id.clone(),
    }
}

// =============================================================================
// SESSION INFO
// =============================================================================

/// Body of `GET /api/session-info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SessionInfo {
    Anonymous { authenticated: bool },
    #[serde(rename_all = "camelCase")]
    Authenticated {
        authenticated: bool,
        username: String,
        session_state: Option<String>,
        check_session_iframe: String,
        client_id: String,
    },
}

#[must_use]
pub fn session_info(user: Option<&OidcUser>, session_value: Option<&str>, config: &OidcConfig) -> SessionInfo {
    let Some(user) = user else {
        return SessionInfo::Anonymous { authenticated: false };
    };
    SessionInfo::Authenticated {
        authenticated: true,
        username: user.username().to_owned(),
        session_state: resolve_session_state(session_value, Some(user)),
        check_session_iframe: config.check_session_iframe.clone(),
        client_id: config.client_id.clone(),
    }
}

// =============================================================================
// LOGOUT
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LogoutError {
    #[error("logout requires an authenticated user with an ID token")]
    Unauthenticated,
}

/// RP-initiated logout URL for the provider's end-session endpoint.
///
/// The ID token and redirect target are interpolated as-is: compact JWTs are
/// URL-safe, and the redirect target must match the value registered with
/// the provider byte for byte.
///
/// # Errors
///
/// Returns [`LogoutError::Unauthenticated`] when there is no user or the
/// user carries no ID token.
pub fn build_logout_url(user: Option<&OidcUser>, config: &OidcConfig) -> Result<String, LogoutError> {
    let id_token = user
        .and_then(|u| u.id_token.as_ref())
        .ok_or(LogoutError::Unauthenticated)?;
    Ok(format!(
        "{}?id_token_hint={}&post_logout_redirect_uri={}",
        config.end_session_endpoint(),
        id_token.token_value,
        config.post_logout_redirect_uri
    ))
}

#[cfg(test)]
#[path = "session_info_test.rs"]
mod tests;
