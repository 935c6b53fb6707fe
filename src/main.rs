mod config;
mod identity;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    // A missing .env is normal outside local development.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = match config::AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    if config.dev_auth_bypass {
        tracing::warn!("DEV_AUTH_BYPASS enabled: /api/dev/login installs principals without an IdP");
    }

    let port = config.port;
    tracing::info!(
        realm = %config.oidc.realm,
        server = %config.oidc.auth_server_url,
        callback_prefix = %config.oidc.callback_prefix,
        "oidc relying party configured"
    );

    let state = state::AppState::with_memory_sessions(config);
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "oidc-session-demo listening");
    axum::serve(listener, app).await.expect("server failed");
}
