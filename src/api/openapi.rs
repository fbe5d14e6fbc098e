//! OpenAPI 3.0 specification definition

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    health::HealthResponse,
    keys::{CreateKeyRequest, CreateKeyResponse, ListKeysResponse, RevokeKeyResponse, ADMIN_TOKEN_HEADER},
};
use crate::domain::KeyInfo;
use crate::error::ErrorBody;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
        components.add_security_scheme(
            "admin_token",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(ADMIN_TOKEN_HEADER))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "VoyagrIQ API Gateway",
        version = "1.0.0",
        description = "API key authentication and per-key hourly rate limiting for the VoyagrIQ API",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/", description = "Current server")
    ),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "keys", description = "Endpoints for API key holders"),
        (name = "admin", description = "API key issuance and revocation")
    ),
    paths(
        crate::api::handlers::health::health_check,
        crate::api::handlers::keys::get_my_key,
        crate::api::handlers::keys::create_key,
        crate::api::handlers::keys::list_keys,
        crate::api::handlers::keys::revoke_key,
    ),
    components(
        schemas(
            HealthResponse,
            KeyInfo,
            ErrorBody,
            CreateKeyRequest,
            CreateKeyResponse,
            ListKeysResponse,
            RevokeKeyResponse,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;
