//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! All routes share one Axum router. The `session_state` interceptor is layered
//! over every route and the fallback, so callback requests are seen even
//! though their handling belongs to the login layer.

pub mod auth;
pub mod capture;
pub mod dashboard;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard::home))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/api/session-info", get(dashboard::session_info))
        .route("/logout-oidc", get(dashboard::logout_oidc))
        .route("/api/dev/login", post(auth::dev_login))
        .route("/healthz", get(healthz))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), capture::capture_session_state))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
