//! API module - HTTP routes and handlers

pub mod handlers;
pub mod middleware;
pub mod openapi;

use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::openapi::ApiDoc;

/// Configure all API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(
                web::scope("/keys")
                    .route("/me", web::get().to(handlers::keys::get_my_key))
            )
    )
    // Key management, guarded by the admin token instead of an API key
    .service(
        web::scope("/admin/keys")
            .route("", web::post().to(handlers::keys::create_key))
            .route("", web::get().to(handlers::keys::list_keys))
            .route("/{id}", web::delete().to(handlers::keys::revoke_key))
    )
    .route("/health", web::get().to(handlers::health::health_check))
    // Swagger UI and OpenAPI spec
    .service(
        SwaggerUi::new("/swagger-ui/{_:.*}")
            .url("/api-docs/openapi.json", ApiDoc::openapi())
    );
}
