//! Barter Backend Service
//!
//! Main entry point for the barter trading backend.
//! This service provides:
//! - JSON HTTP API for users, items, trades and transactions
//! - PostgreSQL or in-memory storage
//! - Optional JSON-lines audit trail of settlements

use anyhow::Context;
use barter_backend::config::{AppConfig, StoreBackend};
use barter_backend::database::{close_pool, create_pool, run_migrations};
use barter_backend::repositories::InMemoryStore;
use barter_backend::{http_service, AppError, AppState, Repositories};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "barter_backend={},sqlx=warn,tower_http=info",
            config.log_level
        )
        .into()
    });

    if config.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        futures::future::pending::<()>().await;
    }
    info!("Shutdown signal received, shutting down gracefully...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    init_tracing(&config);

    info!("Barter backend starting");
    info!("Environment: {}", config.environment);
    info!("Log level: {}", config.log_level);
    info!("Store backend: {}", config.store_backend.as_str());

    // =========================================================================
    // STORE SETUP
    // =========================================================================
    let (repos, pool) = match (config.store_backend, &config.database) {
        (StoreBackend::Postgres, Some(db_config)) => {
            info!("Connecting to database...");
            let pool = create_pool(db_config).await.map_err(|e| {
                error!("Failed to create database pool: {}", e);
                AppError::Database(e)
            })?;
            info!(
                "Database connection pool created (max connections: {})",
                db_config.max_connections
            );

            info!("Running database migrations...");
            run_migrations(&pool, Some(&db_config.migrations_path))
                .await
                .map_err(|e| {
                    error!("Database migration failed: {}", e);
                    AppError::Database(e)
                })?;
            info!("Database migrations completed successfully");

            (Repositories::postgres(pool.clone()), Some(pool))
        }
        (StoreBackend::Postgres, None) => {
            return Err(AppError::Config("DATABASE_URL is required for postgres".into()).into());
        }
        (StoreBackend::Memory, _) => {
            warn!("Using in-memory store; data is lost on shutdown");
            (Repositories::in_memory(Arc::new(InMemoryStore::new())), None)
        }
    };

    // =========================================================================
    // SERVICES
    // =========================================================================
    let addr = config.http_addr();
    let vision_configured = config.vision.url.is_some();
    let app_state = Arc::new(AppState::new(config, repos)?);
    info!("✓ Application state initialized");
    if !vision_configured {
        warn!("VISION_SERVICE_URL not set - deposit analysis will be unavailable");
    }

    // =========================================================================
    // HTTP SERVER
    // =========================================================================
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server on {}", addr))?;
    info!("✓ HTTP API listening on {}", addr);
    info!("Press Ctrl+C to shutdown gracefully");

    let served = axum::serve(listener, http_service::router(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error");

    if let Some(pool) = pool {
        close_pool(&pool).await;
    }

    served?;
    info!("Barter backend shutdown complete");
    Ok(())
}
