//! Health check endpoint

use actix_web::{web, HttpResponse};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    /// Whether the key store answered a ping
    pub key_store: &'static str,
    /// Keys with an open rate window on this instance
    pub tracked_keys: usize,
}

/// GET /health - Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Key store unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let store_ok = match state.keys.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Health check: key store unreachable");
            false
        }
    };

    let response = HealthResponse {
        status: if store_ok { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        key_store: if store_ok { "connected" } else { "unavailable" },
        tracked_keys: state.keys.limiter().tracked_keys(),
    };

    if store_ok {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
