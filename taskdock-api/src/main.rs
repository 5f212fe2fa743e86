//! # Taskdock API Server
//!
//! Generic CRUD backend: user registration/authentication, role-based access
//! control and a tasks resource, persisted to MongoDB.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskdock-api
//! ```

use taskdock_api::app::{build_router, AppState};
use taskdock_api::config::Config;
use taskdock_shared::db::client;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdock_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskdock API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    let db = client::connect(&config.database).await?;
    let state = AppState::new(db, config.clone());

    // Make sure the default admin account exists before serving traffic.
    state
        .users
        .ensure_admin(
            &config.auth.default_admin_email,
            &config.auth.default_admin_password,
        )
        .await?;

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
