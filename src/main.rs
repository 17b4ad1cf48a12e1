use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use video_store_web::cache::{self, AppCache};
use video_store_web::config::AppConfig;
use video_store_web::db::{self, MemoryStore, PgStore, Store};
use video_store_web::rentals::{CheckoutPolicy, Clock};
use video_store_web::{routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "video_store_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = AppConfig::from_env()?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        enforce_inventory = config.enforce_inventory,
        "Loaded configuration"
    );

    // --- Storage ---
    let (store, cache): (Arc<dyn Store>, Option<AppCache>) = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url, config.database_max_connections)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connection pool created");

            db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            let cache = AppCache::new();
            tokio::spawn(cache::start_cache_warmer(
                cache.clone(),
                pool.clone(),
                config.cache_refresh,
            ));

            let store: Arc<dyn Store> = Arc::new(PgStore::new(pool, cache.clone()));
            (store, Some(cache))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store");
            let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
            (store, None)
        }
    };

    let state = AppState::new(
        store,
        cache,
        Clock::System,
        CheckoutPolicy {
            enforce_inventory: config.enforce_inventory,
        },
    );

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, routes::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
