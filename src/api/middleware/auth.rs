//! API Key Authentication
//!
//! The gateway stores the verified credential in request extensions;
//! handlers receive it through the [`AuthenticatedKey`] extractor.

use actix_web::{
    dev::{Payload, ServiceRequest},
    http::header::AUTHORIZATION,
    FromRequest, HttpMessage, HttpRequest,
};
use futures::future::{ready, Ready};

use crate::domain::Credential;
use crate::error::AuthError;

/// Credential admitted by the gateway for the current request
#[derive(Clone, Debug)]
pub struct AuthenticatedKey(pub Credential);

impl AuthenticatedKey {
    pub fn credential(&self) -> &Credential {
        &self.0
    }
}

/// Raw Authorization header value, if present and valid UTF-8
pub fn authorization_header(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

/// Access to the authenticated key from request extensions
pub trait ApiKeyExt {
    fn api_key(&self) -> Option<AuthenticatedKey>;
}

impl<T: HttpMessage> ApiKeyExt for T {
    fn api_key(&self) -> Option<AuthenticatedKey> {
        self.extensions().get::<AuthenticatedKey>().cloned()
    }
}

impl FromRequest for AuthenticatedKey {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // Only reachable without a key when a route is mounted outside the gateway
        ready(req.api_key().ok_or(AuthError::MissingCredential))
    }
}
