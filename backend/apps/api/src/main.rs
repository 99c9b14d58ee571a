//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use accounts::domain::repository::SessionRepository;
use accounts::{AccountsAppState, PgAccountsRepository};
use api::{ServerConfig, build_router, with_http_layers};
use platform::cache::MemoryCache;
use platform::column_store::ColumnStore;
use platform::gatekeeper::GateKeeper;
use social::{COLUMN_TABLES, PgSocialRepository, SocialAppState};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,accounts=info,social=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup cleanup: remove expired sessions
    // Errors here should not prevent server startup
    let accounts_repo = PgAccountsRepository::new(pool.clone());
    match accounts_repo.cleanup_expired_sessions().await {
        Ok(sessions) => {
            tracing::info!(sessions_deleted = sessions, "Session cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Session cleanup failed, continuing anyway");
        }
    }

    if config.session_secret.is_none() {
        tracing::warn!("SESSION_SECRET not set, using a random secret for this process");
    }

    // Rate limit counters and feature switches share one cache
    let cache = MemoryCache::new();
    let gatekeeper = GateKeeper::new(cache.clone());

    // Column tables exist up front so switches can be flipped at runtime
    let columns = ColumnStore::new();
    for table in COLUMN_TABLES {
        columns.create_table(table)?;
    }

    let accounts_state =
        AccountsAppState::new(accounts_repo.clone(), config.accounts_config(), cache);
    let social_state = SocialAppState::new(
        PgSocialRepository::new(pool.clone()),
        accounts_repo,
        columns,
        gatekeeper,
    );

    // Build router
    let app = with_http_layers(
        build_router(accounts_state, social_state),
        &config.frontend_origins,
    );

    // Start server
    tracing::info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
