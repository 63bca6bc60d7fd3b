use axum::{Router, middleware::from_fn_with_state, routing::get};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use signed_sessions_axum::{SessionConfig, SignedSessions, signed_session};

mod handlers;
mod server;

use crate::handlers::{index, login, logout, whoami};
use crate::server::spawn_http_server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Without SESSION_SECRET_KEY the key is ephemeral and every restart
    // signs everyone out
    let mut config = SessionConfig::new();
    if let Ok(secret_key) = std::env::var("SESSION_SECRET_KEY") {
        config = config.with_secret_key(secret_key);
    }
    if let Ok(salt) = std::env::var("SESSION_SALT") {
        config = config.with_salt(salt.into_bytes());
    }

    let sessions = SignedSessions::new(&config)?;

    let app = Router::new()
        .route("/", get(index))
        .route("/whoami", get(whoami))
        .route("/login/{user}", get(login))
        .route("/logout", get(logout))
        .layer(from_fn_with_state(sessions.clone(), signed_session))
        .with_state(sessions);

    let http_server = spawn_http_server(3001, app);

    http_server.await.unwrap();
    Ok(())
}
