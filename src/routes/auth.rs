//! Session cookie plumbing and auth extractors.

use std::convert::Infallible;

use axum::extract::{FromRef, FromRequestParts, Query, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

use crate::identity::{IdToken, OidcUser, SESSION_STATE_CLAIM};
use crate::state::AppState;

pub(crate) const COOKIE_NAME: &str = "SESSION";

/// Session id attached to the request by middleware that created the session
/// on this request, before the browser has seen the cookie.
#[derive(Debug, Clone)]
pub struct SessionId(pub String);

pub(crate) fn session_cookie(id: String, secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

pub(crate) fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build()
}

/// Session id from the request cookie, if any. Not checked against the store.
pub(crate) fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    jar.get(COOKIE_NAME)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

// =============================================================================
// EXTRACTORS
// =============================================================================

/// The caller's live session, if any, and its principal.
/// Never rejects; anonymous callers get `None` for both.
pub struct CurrentSession {
    pub id: Option<String>,
    pub user: Option<OidcUser>,
}

impl<S> FromRequestParts<S> for CurrentSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let candidate = parts
            .extensions
            .get::<SessionId>()
            .map(|SessionId(id)| id.clone())
            .or_else(|| session_id_from_headers(&parts.headers));

        let Some(id) = candidate else {
            return Ok(Self { id: None, user: None });
        };
        if !app_state.sessions.exists(&id).await {
            return Ok(Self { id: None, user: None });
        }
        let user = app_state.sessions.principal(&id).await;
        Ok(Self { id: Some(id), user })
    }
}

/// Authenticated user extracted from the session cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user: OidcUser,
    pub session_id: String,
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let current = CurrentSession::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|never| match never {});
        match current {
            CurrentSession { id: Some(session_id), user: Some(user) } => Ok(Self { user, session_id }),
            _ => Err(StatusCode::UNAUTHORIZED),
        }
    }
}

// =============================================================================
// DEV LOGIN
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct DevLoginQuery {
    username: Option<String>,
    /// Seeds the `session_state` claim of the synthetic ID token.
    session_state: Option<String>,
}

pub(crate) fn dev_user(params: &DevLoginQuery) -> OidcUser {
    let username = params.username.clone().unwrap_or_else(|| "dev".to_owned());
    let subject = format!("dev-{username}");

    let mut claims = serde_json::Map::new();
    claims.insert("sub".into(), subject.clone().into());
    claims.insert("preferred_username".into(), username.clone().into());
    if let Some(value) = params.session_state.as_deref().filter(|v| !v.is_empty()) {
        claims.insert(SESSION_STATE_CLAIM.into(), value.into());
    }

    let id_token = IdToken::new(format!("dev.{subject}.unsigned"), claims);
    OidcUser {
        subject,
        email: Some(format!("{username}@localhost")),
        full_name: Some(format!("Dev {username}")),
        preferred_username: Some(username),
        id_token: Some(id_token),
    }
}

/// `POST /api/dev/login` — install a development principal without an IdP.
///
/// Enabled only when `DEV_AUTH_BYPASS=true`.
pub async fn dev_login(
    State(state): State<AppState>,
    current: CurrentSession,
    Query(params): Query<DevLoginQuery>,
) -> Response {
    if !state.config.dev_auth_bypass {
        return StatusCode::NOT_FOUND.into_response();
    }

    let (session_id, created) = match current.id {
        Some(id) => (id, false),
        None => (state.sessions.create().await, true),
    };
    let user = dev_user(&params);
    let username = user.username().to_owned();
    if !state.sessions.set_principal(&session_id, user).await {
        tracing::error!("session vanished during dev login");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    tracing::warn!(%username, "dev login bypassed the identity provider");

    let body = Json(serde_json::json!({ "username": username }));
    if created {
        let jar = CookieJar::new().add(session_cookie(session_id, state.config.cookie_secure));
        (jar, body).into_response()
    } else {
        body.into_response()
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
