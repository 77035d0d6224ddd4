//! # SocietySync API Server
//!
//! This is the main API server for SocietySync, providing role-based
//! endpoints for society administration: accounts and credentials, billing,
//! complaints, visitor logging, notifications, and polls.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p societysync-api
//! ```

use societysync_api::{
    app::{build_router, AppState},
    config::Config,
};
use societysync_shared::{
    db::{migrations, pool},
    models::user::User,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "societysync_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "SocietySync API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    migrations::ensure_database_exists(&config.database.url).await?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    migrations::run_migrations(&db).await?;

    // First boot of an empty society needs an admin to exist
    User::ensure_default_admin(&db, &config.admin.username, &config.admin.password).await?;

    let bind_address = config.bind_address();
    let state = AppState::new(db, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
