//! Error types for key issuance and request admission
//!
//! Uses thiserror for the Display implementations; the HTTP mapping lives in
//! the `ResponseError` impl so every rejection has the same JSON shape.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::api::middleware::rate_limit::{format_reset, rate_limit_exceeded_response};
use crate::db::DbError;

/// Body shared by invalid and under-entitled keys so neither leaks which it was
pub const UNAUTHORIZED_KEY_MESSAGE: &str = "Invalid or unauthorized API key";

#[derive(Debug, Error)]
pub enum AuthError {
    /// No `Authorization: Bearer <token>` header
    #[error("Missing or invalid Authorization header")]
    MissingCredential,

    /// Unknown, revoked or inactive key
    #[error("Invalid API key")]
    InvalidCredential,

    /// Valid key whose owner is below the required tier
    #[error("API access requires the premium subscription tier")]
    InsufficientEntitlement,

    #[error(
        "Rate limit exceeded. Limit: {limit} requests per hour. Resets at {}",
        format_reset(.reset_at)
    )]
    RateLimitExceeded {
        limit: i32,
        reset_at: DateTime<Utc>,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Key store error: {0}")]
    Persistence(#[from] DbError),
}

/// Error response body
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingCredential
            | AuthError::InvalidCredential
            | AuthError::InsufficientEntitlement => StatusCode::UNAUTHORIZED,
            AuthError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            AuthError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AuthError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AuthError::InvalidCredential | AuthError::InsufficientEntitlement => {
                UNAUTHORIZED_KEY_MESSAGE.to_string()
            }
            AuthError::RateLimitExceeded { limit, reset_at } => {
                return rate_limit_exceeded_response(*limit, *reset_at, &self.to_string());
            }
            AuthError::Persistence(e) => {
                tracing::error!(error = %e, "Key store error");
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        HttpResponse::build(self.status_code()).json(ErrorBody::new(message))
    }
}
