//! Dashboard, session-info and RP-initiated logout routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;

use super::auth::{AuthUser, CurrentSession, clear_session_cookie};
use crate::services::session::SESSION_STATE_ATTR;
use crate::services::session_info::{self, DashboardView, LogoutError, SessionInfo};
use crate::state::AppState;

const INDEX_HTML: &str = r#"<!doctype html>
<html>
  <head><title>OIDC Session Management Demo</title></head>
  <body>
    <h1>OIDC Session Management Demo</h1>
    <p><a href="/dashboard">Dashboard</a> | <a href="/api/session-info">Session info</a></p>
  </body>
</html>
"#;

impl IntoResponse for LogoutError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated => (StatusCode::UNAUTHORIZED, self.to_string()).into_response(),
        }
    }
}

/// `GET /` — landing page.
pub async fn home() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// `GET /dashboard` — view model for the signed-in user.
pub async fn dashboard(State(state): State<AppState>, auth: AuthUser) -> Json<DashboardView> {
    let stored = state.sessions.attribute(&auth.session_id, SESSION_STATE_ATTR).await;
    Json(session_info::render_dashboard(&auth.user, stored.as_deref(), &state.config.oidc))
}

/// `GET /api/session-info` — `session_state` and polling settings; anonymous callers
/// get `{"authenticated": false}`.
pub async fn session_info(State(state): State<AppState>, current: CurrentSession) -> Json<SessionInfo> {
    let stored = match (&current.id, &current.user) {
        (Some(id), Some(_)) => state.sessions.attribute(id, SESSION_STATE_ATTR).await,
        _ => None,
    };
    Json(session_info::session_info(current.user.as_ref(), stored.as_deref(), &state.config.oidc))
}

/// `GET /logout-oidc` — drop the local session and send the browser to the
/// provider's end-session endpoint.
pub async fn logout_oidc(State(state): State<AppState>, auth: AuthUser) -> Result<Response, LogoutError> {
    let logout_url = session_info::build_logout_url(Some(&auth.user), &state.config.oidc).inspect_err(|_| {
        tracing::warn!(subject = %auth.user.subject, "logout requested without an ID token");
    })?;

    state.sessions.remove(&auth.session_id).await;
    tracing::info!(subject = %auth.user.subject, "local session ended, redirecting to end-session endpoint");

    let jar = CookieJar::new().add(clear_session_cookie(state.config.cookie_secure));
    Ok((jar, Redirect::temporary(&logout_url)).into_response())
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
