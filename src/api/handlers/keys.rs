//! API Key Management Handlers
//!
//! `GET /api/v1/keys/me` is served behind the gateway.
//! The `/admin/keys` endpoints issue, list and revoke keys on behalf of an
//! owner and require the configured `X-Admin-Token`.

use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::api::middleware::AuthenticatedKey;
use crate::domain::KeyInfo;
use crate::error::ErrorBody;
use crate::AppState;

/// Header carrying the admin token
pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Request to issue a new API key
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateKeyRequest {
    pub name: String,
    pub owner_id: Uuid,
}

/// Response after issuing a new API key
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateKeyResponse {
    pub id: Uuid,
    pub api_key: String,  // Only shown once!
    pub key_prefix: String,
    pub name: String,
    pub owner_id: Uuid,
    pub rate_limit: i32,
    pub created_at: DateTime<Utc>,
    pub message: String,
}

/// List of API keys response
#[derive(Debug, Serialize, ToSchema)]
pub struct ListKeysResponse {
    pub keys: Vec<KeyInfo>,
    pub count: usize,
}

/// Revocation response
#[derive(Debug, Serialize, ToSchema)]
pub struct RevokeKeyResponse {
    pub revoked: bool,
    pub key_id: Uuid,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct OwnerQuery {
    /// Owning principal of the keys
    pub owner_id: Uuid,
}

/// Check the admin token; `Err` carries the rejection response
fn require_admin(req: &HttpRequest, state: &AppState) -> Result<(), HttpResponse> {
    let Some(expected) = state.settings.auth.admin_token.as_deref().filter(|t| !t.is_empty()) else {
        return Err(HttpResponse::ServiceUnavailable().json(ErrorBody::new(
            "Key management is disabled: no admin token configured",
        )));
    };

    let presented = req.headers()
        .get(ADMIN_TOKEN_HEADER)
        .map(|v| v.as_bytes())
        .unwrap_or_default();

    if bool::from(presented.ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        warn!(path = %req.path(), "Rejected key management request: bad admin token");
        Err(HttpResponse::Unauthorized().json(ErrorBody::new("Invalid admin token")))
    }
}

/// Info about the calling API key
#[utoipa::path(
    get,
    path = "/api/v1/keys/me",
    tag = "keys",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Calling key", body = KeyInfo),
        (status = 401, description = "Missing, invalid or unauthorized key", body = ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = ErrorBody)
    )
)]
pub async fn get_my_key(key: AuthenticatedKey) -> HttpResponse {
    HttpResponse::Ok().json(KeyInfo::from(key.credential()))
}

/// Issue a new API key
#[utoipa::path(
    post,
    path = "/admin/keys",
    tag = "admin",
    request_body = CreateKeyRequest,
    responses(
        (status = 201, description = "Key issued; the plaintext is only returned here", body = CreateKeyResponse),
        (status = 400, description = "Invalid name", body = ErrorBody),
        (status = 401, description = "Bad admin token", body = ErrorBody),
        (status = 500, description = "Key store failure", body = ErrorBody)
    )
)]
pub async fn create_key(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<CreateKeyRequest>,
) -> HttpResponse {
    if let Err(response) = require_admin(&req, &state) {
        return response;
    }

    match state.keys.issue(&body.name, body.owner_id).await {
        Ok(issued) => {
            let key = issued.credential;
            info!(key_id = %key.id, key_prefix = %key.key_prefix, "API key created via admin endpoint");

            HttpResponse::Created().json(CreateKeyResponse {
                id: key.id,
                api_key: issued.api_key,
                key_prefix: key.key_prefix,
                name: key.name,
                owner_id: key.owner_id,
                rate_limit: key.rate_limit,
                created_at: key.created_at,
                message: "API key created successfully. Save the api_key value - it won't be shown again!".to_string(),
            })
        }
        Err(e) => e.error_response(),
    }
}

/// List an owner's API keys
#[utoipa::path(
    get,
    path = "/admin/keys",
    tag = "admin",
    params(OwnerQuery),
    responses(
        (status = 200, description = "Keys of the owner, newest first", body = ListKeysResponse),
        (status = 401, description = "Bad admin token", body = ErrorBody)
    )
)]
pub async fn list_keys(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<OwnerQuery>,
) -> HttpResponse {
    if let Err(response) = require_admin(&req, &state) {
        return response;
    }

    match state.keys.list_keys(query.owner_id).await {
        Ok(keys) => {
            let keys: Vec<KeyInfo> = keys.iter().map(KeyInfo::from).collect();
            let count = keys.len();
            HttpResponse::Ok().json(ListKeysResponse { keys, count })
        }
        Err(e) => e.error_response(),
    }
}

/// Revoke an API key
///
/// Succeeds whether or not a matching key existed, so the response never
/// reveals keys of other owners.
#[utoipa::path(
    delete,
    path = "/admin/keys/{id}",
    tag = "admin",
    params(
        ("id" = Uuid, Path, description = "Key identifier"),
        OwnerQuery
    ),
    responses(
        (status = 200, description = "Key revoked or already absent", body = RevokeKeyResponse),
        (status = 401, description = "Bad admin token", body = ErrorBody),
        (status = 500, description = "Key store failure", body = ErrorBody)
    )
)]
pub async fn revoke_key(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<OwnerQuery>,
) -> HttpResponse {
    if let Err(response) = require_admin(&req, &state) {
        return response;
    }

    let key_id = path.into_inner();
    if state.keys.revoke(key_id, query.owner_id).await {
        HttpResponse::Ok().json(RevokeKeyResponse { revoked: true, key_id })
    } else {
        HttpResponse::InternalServerError().json(ErrorBody::new("Failed to revoke API key"))
    }
}
