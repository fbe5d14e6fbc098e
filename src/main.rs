//! VoyagrIQ API Gateway
//!
//! API key authentication and per-key sliding-window rate limiting in front
//! of the VoyagrIQ API, built on Actix-Web.

use actix_web::{web, App, HttpServer, middleware};
use anyhow::Context;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

mod api;
mod config;
mod db;
mod domain;
mod error;
mod keys;

use crate::api::middleware::ApiGateway;
use crate::config::Settings;
use crate::db::{DbPool, InMemoryKeyStore, KeyStore, PgKeyStore};
use crate::domain::EntitlementTier;
use crate::keys::{ApiKeyService, RateLimiter};

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Settings,
    pub keys: Arc<ApiKeyService>,
    pub started_at: Instant,
}

/// PostgreSQL store when a database URL is configured, in-memory otherwise
async fn build_key_store(settings: &Settings) -> anyhow::Result<Arc<dyn KeyStore>> {
    if settings.database.url.is_empty() {
        warn!("No database URL configured, using in-memory key store (development only)");
        return Ok(Arc::new(
            InMemoryKeyStore::new().with_default_tier(EntitlementTier::TOP),
        ));
    }

    let pool = DbPool::new(&settings.database).context("Failed to create database pool")?;
    pool.test_connection().await.context("Database connection test failed")?;
    info!(
        max_connections = ?settings.database.max_connections,
        require_tls = settings.database.require_tls,
        "Database pool initialized successfully"
    );

    Ok(Arc::new(PgKeyStore::new(pool)))
}

/// Periodically evict rate windows with no request in the last hour
fn spawn_window_sweeper(keys: Arc<ApiKeyService>, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            let evicted = keys.limiter().sweep().await;
            if evicted > 0 {
                info!(evicted, tracked = keys.limiter().tracked_keys(), "Evicted idle rate windows");
            }
        }
    });
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber for structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("voyagriq_gateway=info".parse()?)
                .add_directive("actix_web=info".parse()?)
        )
        .json()
        .init();

    // Load configuration
    let settings = Settings::load().context("Failed to load configuration")?;
    let bind_addr = settings.bind_addr();

    info!(
        "Starting VoyagrIQ gateway v{} on {}",
        env!("CARGO_PKG_VERSION"),
        bind_addr
    );

    if settings.auth.admin_token.as_deref().map_or(true, str::is_empty) {
        warn!("No admin token configured, key management endpoints are disabled");
    }

    let store = build_key_store(&settings).await?;
    let keys = Arc::new(ApiKeyService::new(
        store,
        RateLimiter::in_memory(),
        settings.auth.clone(),
    ));

    spawn_window_sweeper(
        keys.clone(),
        Duration::from_secs(settings.auth.sweep_interval_secs.max(1)),
    );

    let workers = settings.server.workers.unwrap_or_else(|| num_cpus::get() * 2);

    // Create shared application state
    let app_state = web::Data::new(AppState {
        settings,
        keys: keys.clone(),
        started_at: Instant::now(),
    });

    // Configure and start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            // API key authentication and rate limiting
            .wrap(ApiGateway::new(keys.clone()))
            // Middleware (order matters - these wrap around ApiGateway)
            .wrap(TracingLogger::default())
            .wrap(middleware::Compress::default())
            .wrap(
                middleware::DefaultHeaders::new()
                    .add(("X-Service", "voyagriq-gateway"))
                    .add(("X-Version", env!("CARGO_PKG_VERSION")))
            )
            // Routes
            .configure(api::configure_routes)
    })
    .workers(workers)
    .bind(&bind_addr)
    .with_context(|| format!("Failed to bind {}", bind_addr))?
    .run()
    .await?;

    Ok(())
}
