//! Database connection pool management

use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use percent_encoding::percent_decode_str;
use std::sync::Arc;
use thiserror::Error;
use tokio_postgres::NoTls;
use tokio_postgres_rustls::MakeRustlsConnect;
use tracing::info;

use crate::config::DatabaseSettings;

/// Database-related errors
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::CreatePoolError),
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),
    #[error("Pool get error: {0}")]
    PoolGet(#[from] deadpool_postgres::PoolError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Key store unavailable")]
    Unavailable,
}

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DbPool {
    pool: Pool,
}

impl DbPool {
    /// Create a new database pool from the database settings
    pub fn new(settings: &DatabaseSettings) -> Result<Self, DbError> {
        let url = url::Url::parse(&settings.url)
            .map_err(|e| DbError::Config(format!("Invalid database URL: {}", e)))?;

        let host = url.host_str()
            .ok_or_else(|| DbError::Config("Missing host in database URL".to_string()))?;
        let port = url.port().unwrap_or(5432);
        let user = percent_decode_str(url.username()).decode_utf8_lossy().into_owned();
        // Hosted Postgres passwords routinely contain reserved characters
        let password = url.password()
            .map(|p| percent_decode_str(p).decode_utf8_lossy().into_owned())
            .unwrap_or_default();
        let dbname = url.path().trim_start_matches('/');

        let mut cfg = Config::new();
        cfg.host = Some(host.to_string());
        cfg.port = Some(port);
        cfg.user = Some(user);
        cfg.password = Some(password);
        cfg.dbname = Some(if dbname.is_empty() { "postgres".to_string() } else { dbname.to_string() });

        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        if let Some(max) = settings.max_connections {
            cfg.pool = Some(PoolConfig::new(max as usize));
        }

        let pool = if settings.require_tls {
            cfg.create_pool(Some(Runtime::Tokio1), tls_connector()?)?
        } else {
            cfg.create_pool(Some(Runtime::Tokio1), NoTls)?
        };

        info!(
            host = %host,
            port = %port,
            dbname = %dbname,
            tls = settings.require_tls,
            "Database pool created"
        );

        Ok(DbPool { pool })
    }

    /// Get a connection from the pool
    pub async fn get(&self) -> Result<deadpool_postgres::Object, DbError> {
        Ok(self.pool.get().await?)
    }

    /// Test the database connection
    pub async fn test_connection(&self) -> Result<(), DbError> {
        let client = self.get().await?;
        client.query_one("SELECT 1", &[]).await?;
        info!("Database connection test successful");
        Ok(())
    }
}

/// rustls connector trusting the Mozilla root set
fn tls_connector() -> Result<MakeRustlsConnect, DbError> {
    let mut roots = rustls::RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = rustls::ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(|e| DbError::Config(format!("TLS configuration error: {}", e)))?
    .with_root_certificates(roots)
    .with_no_client_auth();

    Ok(MakeRustlsConnect::new(config))
}
