//! # Taskboard API Server
//!
//! REST API for the Taskboard task tracker: users, task statuses, labels and
//! tasks with filtering and tri-state partial updates.
//!
//! ## Usage
//!
//! ```bash
//! STORAGE_BACKEND=memory JWT_SECRET=... SEED_DATA=true cargo run -p taskboard-api
//! ```

use std::sync::Arc;
use taskboard_api::{
    app::{build_router, AppState},
    config::{Config, StorageBackend},
};
use taskboard_shared::db::{
    migrations::{ensure_database_exists, run_migrations},
    pool::{close_pool, create_pool, DatabaseConfig},
};
use taskboard_shared::seed::seed;
use taskboard_shared::store::{MemoryStore, PgStore, Store};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "taskboard_api=debug,taskboard_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Taskboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let (store, pg_store): (Arc<dyn Store>, Option<PgStore>) = match (config.storage, &config.database) {
        (StorageBackend::Postgres, Some(database)) => {
            ensure_database_exists(&database.url).await?;

            let pool = create_pool(DatabaseConfig {
                max_connections: database.max_connections,
                ..DatabaseConfig::new(database.url.clone())
            })
            .await?;
            run_migrations(&pool).await?;

            let pg_store = PgStore::new(pool);
            (Arc::new(pg_store.clone()), Some(pg_store))
        }
        (StorageBackend::Postgres, None) => {
            anyhow::bail!("DATABASE_URL is required for the postgres backend")
        }
        (StorageBackend::Memory, _) => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            (Arc::new(MemoryStore::new()), None)
        }
    };

    if config.seed_data {
        seed(store.as_ref()).await?;
    }

    let address = config.bind_address();
    let backend = store.backend();
    let state = AppState::new(store, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(backend, "Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pg_store) = pg_store {
        close_pool(pg_store.pool()).await;
    }
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
