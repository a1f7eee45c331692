//! Token verification seam and the authenticated identity it yields.

use crate::errors::AppError;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Identity of a verified caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AuthUser {
    /// Stable subject identifier from the identity provider
    pub subject_id: String,
    pub email: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No token provided")]
    MissingToken,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::ProviderUnavailable(msg) => AppError::ServiceUnavailable(msg),
            AuthError::MissingToken => AppError::Unauthorized("Authentication required".into()),
            AuthError::Expired => AppError::Unauthorized("Token has expired".into()),
            AuthError::InvalidToken(_) => AppError::Unauthorized("Invalid token".into()),
        }
    }
}

/// Verifies an opaque bearer token against the identity provider.
///
/// The default implementation is [`JwtVerifier`](super::JwtVerifier); tests
/// and alternative providers plug in their own.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify_token(&self, token: &str) -> Result<AuthUser, AuthError>;
}

/// Reads the identity inserted by [`require_auth`](super::require_auth).
///
/// Rejects with 401 when the route is not behind the auth middleware or the
/// caller is anonymous.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or_else(|| AuthError::MissingToken.into())
    }
}
