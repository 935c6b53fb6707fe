//! Authorization-response interceptor.
//!
//! SYSTEM CONTEXT
//! ==============
//! The OP redirects the browser back to the callback prefix with `code`,
//! `state` and, when session management is enabled, `session_state`. The code
//! exchange belongs to the login layer further down the stack; this
//! middleware only copies `session_state` onto the web session and then hands
//! the request on untouched.

use axum::extract::{Query, Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;

use super::auth::{SessionId, session_cookie, session_id_from_headers};
use crate::services::session::SESSION_STATE_ATTR;
use crate::state::AppState;

const SESSION_STATE_PARAM: &str = "session_state";

/// First non-empty `session_state` in a query string, `None` when absent,
/// empty, or the query cannot be decoded. Repeated keys are tolerated.
pub(crate) fn session_state_param(uri: &axum::http::Uri) -> Option<String> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(uri).ok()?;
    pairs
        .into_iter()
        .find(|(key, value)| key == SESSION_STATE_PARAM && !value.is_empty())
        .map(|(_, value)| value)
}

/// Middleware capturing `session_state` on callback requests.
///
/// Runs on every request; anything outside the callback prefix passes straight
/// through. A missing parameter is logged and otherwise ignored, and a value
/// already on the session is left alone in that case.
pub async fn capture_session_state(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    if !request.uri().path().starts_with(state.config.oidc.callback_prefix.as_str()) {
        return next.run(request).await;
    }

    tracing::info!(url = %request.uri(), "oidc callback received");

    let Some(session_state) = session_state_param(request.uri()) else {
        tracing::warn!(path = %request.uri().path(), "oidc callback without session_state parameter");
        return next.run(request).await;
    };

    let existing = match session_id_from_headers(request.headers()) {
        Some(id) if state.sessions.exists(&id).await => Some(id),
        _ => None,
    };
    let created = existing.is_none();
    let session_id = match existing {
        Some(id) => id,
        None => state.sessions.create().await,
    };

    if state
        .sessions
        .set_attribute(&session_id, SESSION_STATE_ATTR, session_state.clone())
        .await
    {
        tracing::info!(%session_state, "captured session_state from authorization response");
    } else {
        tracing::warn!("session expired before session_state could be stored");
    }

    request.extensions_mut().insert(SessionId(session_id.clone()));
    let response = next.run(request).await;

    if created {
        let jar = CookieJar::new().add(session_cookie(session_id, state.config.cookie_secure));
        (jar, response).into_response()
    } else {
        response
    }
}

#[cfg(test)]
#[path = "capture_test.rs"]
mod tests;
